//! Submission guards that must hold without a reachable backend.

use farmgate_lib::MarketplaceClient;
use farmgate_lib::auth::StaticTokenProvider;
use farmgate_lib::error::Error;
use farmgate_lib::model::Record;
use farmgate_lib::validation::Validator;

fn offline_client() -> MarketplaceClient {
    MarketplaceClient::builder()
        .url("http://127.0.0.1:9/api")
        .token_provider(StaticTokenProvider::anonymous())
        .build()
        .unwrap()
}

fn product_rules() -> Validator {
    Validator::new()
        .field("name")
        .required("Name is required")
        .field("price")
        .required("Price is required")
        .positive("Price must be positive")
        .build()
}

#[tokio::test]
async fn test_invalid_record_is_not_sent() {
    let client = offline_client();
    let product = Record::new("products").set("price", 0);

    let err = client
        .submit("products", product, &product_rules())
        .await
        .unwrap_err();

    let errors = match err {
        Error::Validation(errors) => errors,
        other => panic!("expected validation error, got {other:?}"),
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(client.actions().pending(), 0);
}

#[tokio::test]
async fn test_second_submit_while_pending_is_refused() {
    let client = offline_client();
    let _pending = client.actions().try_begin("create:products").unwrap();

    let product = Record::new("products")
        .set("name", "Rainbow chard")
        .set("price", 2.75);
    let err = client
        .submit("products", product, &product_rules())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Busy { ref action } if action == "create:products"));
}
