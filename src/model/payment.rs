use super::*;

pub const DEFAULT_PAYER_NAME: &str = "Клиент";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    #[default]
    Course,
    Consultation,
    Combo,
}

/// Body of `?action=create` on the payment service.
#[derive(Debug, Clone, PartialEq, Serialize, new)]
pub struct PaymentRequest {
    pub user_id: UserId,
    pub amount: f64,
    pub email: String,
    pub return_url: String,
    #[new(value = "DEFAULT_PAYER_NAME.to_string()")]
    pub name: String,
    #[new(default)]
    pub product_type: ProductType,
}

impl PaymentRequest {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_product(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaymentCreated {
    pub payment_id: String,
    pub purchase_id: PurchaseId,
    pub confirmation_url: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PaymentStatus {
    pub payment_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub paid: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn request_defaults() {
        let request = PaymentRequest::new(
            UserId(1),
            2999.0,
            "a@b.c".to_string(),
            "https://site.example/payment-success".to_string(),
        );

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "user_id": 1,
                "amount": 2999.0,
                "email": "a@b.c",
                "return_url": "https://site.example/payment-success",
                "name": "Клиент",
                "product_type": "course"
            })
        );
    }

    #[test]
    fn status_without_paid_flag_is_unpaid() {
        let status: PaymentStatus =
            serde_json::from_value(json!({"payment_id": "p-1", "status": "pending"})).unwrap();
        assert!(!status.paid);
    }
}
