use crate::cli::{BodyArgs, IdArgs, ListArgs, OutputFormat, UpdateArgs};
use crate::client::{AppContext, CliResult, api_failure, read_json_file, required};
use crate::output::render_value;

pub(crate) async fn handle_product_list(
    ctx: &AppContext,
    args: ListArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let products = ctx
        .api
        .products()
        .list(&args.query)
        .await
        .map_err(api_failure)?;
    render_value(&products, format)
}

pub(crate) async fn handle_product_get(
    ctx: &AppContext,
    args: IdArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let id = required("product id", &args.id)?;
    let product = ctx.api.products().get(&id).await.map_err(api_failure)?;
    render_value(&product, format)
}

pub(crate) async fn handle_product_create(
    ctx: &AppContext,
    args: BodyArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let body = read_json_file(&args.file)?;
    let created = ctx
        .api
        .products()
        .create(&body)
        .await
        .map_err(api_failure)?;
    render_value(&created, format)
}

pub(crate) async fn handle_product_update(
    ctx: &AppContext,
    args: UpdateArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let id = required("product id", &args.id)?;
    let changes = read_json_file(&args.file)?;
    let updated = ctx
        .api
        .products()
        .update(&id, &changes)
        .await
        .map_err(api_failure)?;
    render_value(&updated, format)
}

pub(crate) async fn handle_product_delete(ctx: &AppContext, args: IdArgs) -> CliResult<()> {
    let id = required("product id", &args.id)?;
    ctx.api.products().delete(&id).await.map_err(api_failure)?;
    println!("deleted product {id}");
    Ok(())
}
