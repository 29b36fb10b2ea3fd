use crate::cli::{BodyArgs, IdArgs, ListArgs, OutputFormat, UpdateArgs};
use crate::client::{AppContext, CliResult, api_failure, read_json_file, required};
use crate::output::render_value;

pub(crate) async fn handle_user_list(
    ctx: &AppContext,
    args: ListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let users = ctx
        .api
        .users()
        .list(&args.query)
        .await
        .map_err(api_failure)?;
    render_value(&users, format)
}

pub(crate) async fn handle_user_create(
    ctx: &AppContext,
    args: BodyArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let body = read_json_file(&args.file)?;
    let created = ctx.api.users().create(&body).await.map_err(api_failure)?;
    render_value(&created, format)
}

pub(crate) async fn handle_user_update(
    ctx: &AppContext,
    args: UpdateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let id = required("user id", &args.id)?;
    let changes = read_json_file(&args.file)?;
    let updated = ctx
        .api
        .users()
        .update(&id, &changes)
        .await
        .map_err(api_failure)?;
    render_value(&updated, format)
}

pub(crate) async fn handle_user_delete(ctx: &AppContext, args: IdArgs) -> CliResult<()> {
    let id = required("user id", &args.id)?;
    ctx.api.users().delete(&id).await.map_err(api_failure)?;
    println!("deleted user {id}");
    Ok(())
}
