use std::sync::Arc;

use anyhow::Result;
use httpmock::prelude::*;
use serde_json::{Value, json};
use storefront_api_models::{Credentials, Registration};
use storefront_client::{ApiClient, UploadFile};
use storefront_session::{
    CredentialStore, FetchOutcome, KeyValueStorage, MemoryStorage, SessionState, TOKEN_KEY,
};

fn client_for(server: &MockServer, session: Arc<CredentialStore>) -> Result<ApiClient> {
    Ok(ApiClient::builder(server.base_url().parse()?, session).build()?)
}

fn logged_in(token: &str) -> Result<(Arc<MemoryStorage>, Arc<CredentialStore>)> {
    let storage = Arc::new(MemoryStorage::new());
    let session = Arc::new(CredentialStore::new(storage.clone())?);
    session.login(token)?;
    Ok((storage, session))
}

#[tokio::test]
async fn login_then_fetch_user_then_rejection_returns_to_anonymous() -> Result<()> {
    let server = MockServer::start_async().await;
    let (storage, session) = logged_in("abc123")?;
    let client = client_for(&server, Arc::clone(&session))?;

    let mut profile = server.mock(|when, then| {
        when.method(GET)
            .path("/users/me")
            .header("authorization", "Bearer abc123");
        then.status(200).json_body(json!({"id": 1, "name": "Ann"}));
    });

    let outcome = session.fetch_user(&client).await;
    assert_eq!(
        outcome,
        FetchOutcome::Loaded(json!({"id": 1, "name": "Ann"}))
    );
    assert_eq!(session.state(), SessionState::Verified);
    assert_eq!(session.user(), Some(json!({"id": 1, "name": "Ann"})));
    profile.assert();
    profile.delete();

    let rejected = server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(401)
            .json_body(json!({"detail": "Could not validate credentials"}));
    });

    let outcome = session.fetch_user(&client).await;
    let FetchOutcome::Invalidated(error) = &outcome else {
        anyhow::bail!("expected invalidation, got {outcome:?}");
    };
    assert_eq!(error.message(), "Could not validate credentials");
    assert_eq!(error.status(), Some(401));
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.user(), None);
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    rejected.assert();
    Ok(())
}

#[tokio::test]
async fn anonymous_requests_carry_no_authorization_header() -> Result<()> {
    let server = MockServer::start_async().await;
    let client = client_for(&server, Arc::new(CredentialStore::in_memory()))?;

    let authorized = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/products")
            .header_exists("authorization");
        then.status(200).json_body(json!(["unexpected"]));
    });
    let anonymous = server.mock(|when, then| {
        when.method(GET).path("/admin/products");
        then.status(200).json_body(json!([]));
    });

    let products = client.products().list(&[]).await?;
    assert_eq!(products, json!([]));
    assert_eq!(authorized.hits(), 0);
    anonymous.assert();
    Ok(())
}

#[tokio::test]
async fn fetch_user_while_anonymous_makes_no_request() -> Result<()> {
    let server = MockServer::start_async().await;
    let session = Arc::new(CredentialStore::in_memory());
    let client = client_for(&server, Arc::clone(&session))?;
    let me = server.mock(|when, then| {
        when.method(GET).path("/users/me");
        then.status(200).json_body(json!({"id": 1}));
    });

    assert_eq!(session.fetch_user(&client).await, FetchOutcome::Anonymous);
    assert_eq!(me.hits(), 0);
    assert_eq!(session.state(), SessionState::Anonymous);
    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_fail_closed() -> Result<()> {
    let (storage, session) = logged_in("abc123")?;
    let client = ApiClient::builder("http://127.0.0.1:9".parse()?, Arc::clone(&session)).build()?;

    let outcome = session.fetch_user(&client).await;
    let FetchOutcome::Invalidated(error) = &outcome else {
        anyhow::bail!("expected invalidation, got {outcome:?}");
    };
    assert_eq!(error.message(), "Failed to fetch user info");
    assert_eq!(error.status(), None);
    assert!(!session.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    Ok(())
}

#[tokio::test]
async fn backend_detail_and_fallback_messages() -> Result<()> {
    let server = MockServer::start_async().await;
    let client = client_for(&server, Arc::new(CredentialStore::in_memory()))?;

    let login = server.mock(|when, then| {
        when.method(POST)
            .path("/users/login")
            .json_body(json!({"email": "ann@example.com", "password": "wrong"}));
        then.status(401).json_body(json!({"detail": "Invalid credentials"}));
    });
    let register = server.mock(|when, then| {
        when.method(POST).path("/users/register");
        then.status(500).body("Internal Server Error");
    });

    let err = client
        .users()
        .login(&Credentials {
            email: "ann@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("login should fail"))?;
    assert_eq!(err.message(), "Invalid credentials");

    let err = client
        .users()
        .register(&Registration {
            email: "ann@example.com".to_string(),
            name: "Ann".to_string(),
            password: "secret".to_string(),
        })
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("registration should fail"))?;
    assert_eq!(err.message(), "Registration failed");
    assert_eq!(err.status(), Some(500));

    login.assert();
    register.assert();
    Ok(())
}

#[tokio::test]
async fn validation_errors_are_joined_into_one_message() -> Result<()> {
    let server = MockServer::start_async().await;
    let (_, session) = logged_in("abc123")?;
    let client = client_for(&server, session)?;
    server.mock(|when, then| {
        when.method(POST).path("/admin/products");
        then.status(422).json_body(json!({
            "detail": [
                {"loc": ["body", "name"], "msg": "Field required", "type": "missing"},
                {"loc": ["body", "price"], "msg": "Input should be greater than 0", "type": "greater_than"}
            ]
        }));
    });

    let err = client
        .products()
        .create(&json!({"price": 0}))
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("create should fail"))?;
    assert_eq!(
        err.message(),
        "Field required; Input should be greater than 0"
    );
    Ok(())
}

#[tokio::test]
async fn login_returns_token_for_the_session() -> Result<()> {
    let server = MockServer::start_async().await;
    let session = Arc::new(CredentialStore::in_memory());
    let client = client_for(&server, Arc::clone(&session))?;
    server.mock(|when, then| {
        when.method(POST).path("/users/login");
        then.status(200)
            .json_body(json!({"access_token": "abc123", "token_type": "bearer"}));
    });
    let me = server.mock(|when, then| {
        when.method(GET)
            .path("/users/me")
            .header("authorization", "Bearer abc123");
        then.status(200).json_body(json!({"id": 1, "name": "Ann"}));
    });

    let token = client
        .users()
        .login(&Credentials {
            email: "ann@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await?;
    session.login(token.access_token)?;
    assert!(matches!(
        session.fetch_user(&client).await,
        FetchOutcome::Loaded(_)
    ));
    me.assert();
    Ok(())
}

#[tokio::test]
async fn product_crud_uses_admin_paths() -> Result<()> {
    let server = MockServer::start_async().await;
    let (_, session) = logged_in("abc123")?;
    let client = client_for(&server, session)?;

    let list = server.mock(|when, then| {
        when.method(GET)
            .path("/admin/products")
            .query_param("skip", "0")
            .query_param("limit", "20")
            .header("authorization", "Bearer abc123");
        then.status(200).json_body(json!([{"id": 7}]));
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/admin/products/7");
        then.status(200).json_body(json!({"id": 7, "name": "Boot"}));
    });
    let update = server.mock(|when, then| {
        when.method(PUT)
            .path("/admin/products/7")
            .json_body(json!({"name": "Boot v2"}));
        then.status(200).json_body(json!({"id": 7, "name": "Boot v2"}));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/admin/products/7");
        then.status(204);
    });

    let query = vec![
        ("skip".to_string(), "0".to_string()),
        ("limit".to_string(), "20".to_string()),
    ];
    assert_eq!(client.products().list(&query).await?, json!([{"id": 7}]));
    assert_eq!(
        client.products().get("7").await?,
        json!({"id": 7, "name": "Boot"})
    );
    assert_eq!(
        client
            .products()
            .update("7", &json!({"name": "Boot v2"}))
            .await?["name"],
        "Boot v2"
    );
    assert_eq!(client.products().delete("7").await?, Value::Null);

    list.assert();
    get.assert();
    update.assert();
    delete.assert();
    Ok(())
}

#[tokio::test]
async fn user_admin_and_profile_endpoints() -> Result<()> {
    let server = MockServer::start_async().await;
    let (_, session) = logged_in("abc123")?;
    let client = client_for(&server, session)?;

    let update_profile = server.mock(|when, then| {
        when.method(PUT)
            .path("/users/me")
            .json_body(json!({"name": "Ann B"}));
        then.status(200).json_body(json!({"id": 1, "name": "Ann B"}));
    });
    let list = server.mock(|when, then| {
        when.method(GET).path("/admin/users");
        then.status(200).json_body(json!([{"id": 1}]));
    });
    let create = server.mock(|when, then| {
        when.method(POST).path("/admin/users");
        then.status(201).json_body(json!({"id": 2}));
    });
    let update = server.mock(|when, then| {
        when.method(PUT).path("/admin/users/2");
        then.status(200).json_body(json!({"id": 2, "is_admin": true}));
    });
    let delete = server.mock(|when, then| {
        when.method(DELETE).path("/admin/users/2");
        then.status(404).json_body(json!({"detail": "User not found"}));
    });

    client
        .users()
        .update_profile(&json!({"name": "Ann B"}))
        .await?;
    client.users().list(&[]).await?;
    client.users().create(&json!({"email": "bo@example.com"})).await?;
    client
        .users()
        .update("2", &json!({"is_admin": true}))
        .await?;
    let err = client
        .users()
        .delete("2")
        .await
        .err()
        .ok_or_else(|| anyhow::anyhow!("delete should fail"))?;
    assert_eq!(err.message(), "User not found");

    update_profile.assert();
    list.assert();
    create.assert();
    update.assert();
    delete.assert();
    Ok(())
}

#[tokio::test]
async fn image_upload_posts_multipart() -> Result<()> {
    let server = MockServer::start_async().await;
    let (_, session) = logged_in("abc123")?;
    let client = client_for(&server, session)?;

    let upload = server.mock(|when, then| {
        when.method(POST)
            .path("/files/upload/images")
            .header("authorization", "Bearer abc123")
            .header_exists("content-type");
        then.status(200)
            .json_body(json!({"urls": ["/static/shoe.png"]}));
    });

    let response = client
        .uploads()
        .images(vec![UploadFile {
            file_name: "shoe.png".to_string(),
            content_type: Some("image/png".to_string()),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }])
        .await?;
    assert_eq!(response, json!({"urls": ["/static/shoe.png"]}));
    upload.assert();
    Ok(())
}
