use lesson_watch::error::ApplicationError;

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    lesson_watch::run().await
}
