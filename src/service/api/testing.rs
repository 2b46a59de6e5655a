use axum::Router;
use url::Url;

/// Serves `router` on an ephemeral local port and returns its base url.
pub async fn serve(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let address = listener.local_addr().expect("listener address");

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve test router");
    });

    Url::parse(&format!("http://{address}/")).expect("test url")
}

pub fn http() -> super::Http {
    super::Http::new(std::time::Duration::from_secs(5)).expect("build http client")
}
