use crate::context::{runtime, Context};
use anyhow::{bail, Result};
use repolens_client::AnalysisService;
use repolens_report::{assemble, render_text};

/// Execute `repolens report <id>`
pub fn execute(api: Option<&str>, id: &str, json: bool) -> Result<()> {
    let ctx = Context::load(api);
    let service = ctx.service();
    let rt = runtime()?;
    rt.block_on(show(service.as_ref(), id, json))
}

/// Fetch, assemble, and print the report. A failed fetch prints nothing on
/// stdout.
pub async fn show(service: &dyn AnalysisService, id: &str, json: bool) -> Result<()> {
    let bundle = match assemble(service, id).await {
        Ok(bundle) => bundle,
        Err(err) => bail!("{err}\n{}", err.recovery_hint()),
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print!("{}", render_text(&bundle));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repolens_client::MockService;
    use repolens_core::ClientError;

    #[tokio::test]
    async fn fetch_failure_is_an_error_with_hint() {
        let svc = MockService::new();
        svc.push_report(Err(ClientError::Network("connection refused".into())));
        let err = show(&svc, "9", false).await.unwrap_err().to_string();
        assert!(err.contains("failed to load report for analysis 9"));
        assert!(err.contains("repolens analyze"));
    }

    #[tokio::test]
    async fn json_output_succeeds() {
        let svc = MockService::new();
        show(&svc, "9", true).await.unwrap();
        assert_eq!(svc.report_calls(), 1);
    }
}
