use anyhow::anyhow;
use storefront_api_models::{Credentials, Registration};
use storefront_session::FetchOutcome;

use crate::cli::{BodyArgs, LoginArgs, OutputFormat, RegisterArgs};
use crate::client::{
    AppContext, CliError, CliResult, api_failure, read_json_file, required, resolve_password,
};
use crate::output::render_value;

pub(crate) async fn handle_login(
    ctx: &AppContext,
    args: LoginArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let email = required("email", &args.email)?;
    let password = resolve_password(args.password.as_deref())?;

    let token = ctx
        .api
        .users()
        .login(&Credentials { email, password })
        .await
        .map_err(api_failure)?;
    ctx.session()
        .login(token.access_token)
        .map_err(CliError::failure)?;

    match ctx.session().fetch_user(&ctx.api).await {
        FetchOutcome::Loaded(user) => render_value(&user, format),
        FetchOutcome::Invalidated(error) => Err(api_failure(error)),
        FetchOutcome::Anonymous | FetchOutcome::Superseded => Err(CliError::failure(anyhow!(
            "session ended before the profile loaded"
        ))),
    }
}

pub(crate) async fn handle_register(
    ctx: &AppContext,
    args: RegisterArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let registration = Registration {
        email: required("email", &args.email)?,
        name: required("name", &args.name)?,
        password: resolve_password(args.password.as_deref())?,
    };
    let created = ctx
        .api
        .users()
        .register(&registration)
        .await
        .map_err(api_failure)?;
    render_value(&created, format)
}

pub(crate) fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    ctx.session().logout().map_err(CliError::failure)?;
    println!("logged out");
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    match ctx.session().fetch_user(&ctx.api).await {
        FetchOutcome::Loaded(user) => render_value(&user, format),
        FetchOutcome::Anonymous => {
            println!("not logged in");
            Ok(())
        }
        FetchOutcome::Invalidated(error) => Err(api_failure(error)),
        FetchOutcome::Superseded => Err(CliError::failure(anyhow!(
            "session changed while the profile was loading"
        ))),
    }
}

pub(crate) async fn handle_profile_update(
    ctx: &AppContext,
    args: BodyArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let changes = read_json_file(&args.file)?;
    let updated = ctx
        .api
        .users()
        .update_profile(&changes)
        .await
        .map_err(api_failure)?;
    render_value(&updated, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::Arc;
    use storefront_session::{
        CredentialStore, FileStorage, KeyValueStorage, SessionState, TOKEN_KEY,
    };
    use tempfile::TempDir;

    fn context_with(server: &MockServer, session: Arc<CredentialStore>) -> Result<AppContext> {
        AppContext::with_session(server.base_url().parse()?, session, "trace-test")
            .map_err(|err| anyhow!(err.display_message()))
    }

    fn login_args(password: &str) -> LoginArgs {
        LoginArgs {
            email: "ann@example.com".to_string(),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn login_persists_token_and_verifies_profile() -> Result<()> {
        let server = MockServer::start_async().await;
        let dir = TempDir::new()?;
        let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
        let session = Arc::new(CredentialStore::new(storage.clone())?);
        let ctx = context_with(&server, Arc::clone(&session))?;

        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/users/login")
                .header("x-request-id", "trace-test")
                .json_body(json!({"email": "ann@example.com", "password": "secret"}));
            then.status(200)
                .json_body(json!({"access_token": "abc123", "token_type": "bearer"}));
        });
        let me = server.mock(|when, then| {
            when.method(GET)
                .path("/users/me")
                .header("authorization", "Bearer abc123");
            then.status(200).json_body(json!({"id": 1, "name": "Ann"}));
        });

        handle_login(&ctx, login_args("secret"), OutputFormat::Json)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        login.assert();
        me.assert();
        assert_eq!(session.state(), SessionState::Verified);
        assert_eq!(storage.get(TOKEN_KEY)?, Some("abc123".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_leaves_session_anonymous() -> Result<()> {
        let server = MockServer::start_async().await;
        let session = Arc::new(CredentialStore::in_memory());
        let ctx = context_with(&server, Arc::clone(&session))?;
        server.mock(|when, then| {
            when.method(POST).path("/users/login");
            then.status(401).json_body(json!({"detail": "Invalid credentials"}));
        });

        let err = handle_login(&ctx, login_args("wrong"), OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("login should fail"))?;
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.display_message(), "Invalid credentials (status 401)");
        assert!(!session.is_authenticated());
        Ok(())
    }

    #[tokio::test]
    async fn whoami_without_session_makes_no_request() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context_with(&server, Arc::new(CredentialStore::in_memory()))?;
        let me = server.mock(|when, then| {
            when.method(GET).path("/users/me");
            then.status(200).json_body(json!({"id": 1}));
        });

        handle_whoami(&ctx, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(me.hits(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn whoami_with_expired_token_logs_out() -> Result<()> {
        let server = MockServer::start_async().await;
        let session = Arc::new(CredentialStore::in_memory());
        session.login("stale")?;
        let ctx = context_with(&server, Arc::clone(&session))?;
        server.mock(|when, then| {
            when.method(GET).path("/users/me");
            then.status(401)
                .json_body(json!({"detail": "Could not validate credentials"}));
        });

        let err = handle_whoami(&ctx, OutputFormat::Table)
            .await
            .err()
            .ok_or_else(|| anyhow!("whoami should fail"))?;
        assert_eq!(
            err.display_message(),
            "Could not validate credentials (status 401)"
        );
        assert_eq!(session.token(), None);
        Ok(())
    }

    #[tokio::test]
    async fn register_rejection_is_a_validation_error() -> Result<()> {
        let server = MockServer::start_async().await;
        let ctx = context_with(&server, Arc::new(CredentialStore::in_memory()))?;
        let register = server.mock(|when, then| {
            when.method(POST)
                .path("/users/register")
                .json_body(json!({"email": "ann@example.com", "name": "Ann", "password": "secret"}));
            then.status(400)
                .json_body(json!({"detail": "Email already registered"}));
        });

        let err = handle_register(
            &ctx,
            RegisterArgs {
                email: "ann@example.com".to_string(),
                name: "Ann".to_string(),
                password: Some("secret".to_string()),
            },
            OutputFormat::Json,
        )
        .await
        .err()
        .ok_or_else(|| anyhow!("registration should fail"))?;
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.display_message(), "Email already registered");
        register.assert();
        Ok(())
    }

    #[test]
    fn logout_clears_session() -> Result<()> {
        let session = Arc::new(CredentialStore::in_memory());
        session.login("abc123")?;
        let ctx = AppContext::with_session(
            "http://127.0.0.1:8000".parse()?,
            Arc::clone(&session),
            "trace-test",
        )
        .map_err(|err| anyhow!(err.display_message()))?;

        handle_logout(&ctx).map_err(|err| anyhow!(err.display_message()))?;
        handle_logout(&ctx).map_err(|err| anyhow!(err.display_message()))?;
        assert_eq!(session.state(), SessionState::Anonymous);
        Ok(())
    }

    #[tokio::test]
    async fn profile_update_sends_file_contents() -> Result<()> {
        let server = MockServer::start_async().await;
        let session = Arc::new(CredentialStore::in_memory());
        session.login("abc123")?;
        let ctx = context_with(&server, session)?;
        let dir = TempDir::new()?;
        let body = dir.path().join("profile.json");
        std::fs::write(&body, r#"{"name": "Ann B"}"#)?;

        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/users/me")
                .header("authorization", "Bearer abc123")
                .json_body(json!({"name": "Ann B"}));
            then.status(200).json_body(json!({"id": 1, "name": "Ann B"}));
        });

        handle_profile_update(&ctx, BodyArgs { file: body }, OutputFormat::Table)
            .await
            .map_err(|err| anyhow!(err.display_message()))?;
        update.assert();
        Ok(())
    }
}
