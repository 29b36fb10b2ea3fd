use anyhow::Context;
use storefront_client::UploadFile;

use crate::cli::{OutputFormat, UploadImagesArgs};
use crate::client::{AppContext, CliError, CliResult, api_failure};
use crate::output::render_value;

pub(crate) async fn handle_upload_images(
    ctx: &AppContext,
    args: UploadImagesArgs,
    format: OutputFormat,
) -> CliResult<()> {
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
            .map_err(CliError::failure)?;
        if file.content_type.is_none() {
            return Err(CliError::validation(format!(
                "{} is not a recognised image type",
                path.display()
            )));
        }
        files.push(file);
    }

    let response = ctx
        .api
        .uploads()
        .images(files)
        .await
        .map_err(api_failure)?;
    render_value(&response, format)
}
