use anyhow::Result;
use baton_core::configs::pipeline::PipelineFileConfig;

pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(PipelineFileConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
