use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_distinct_paths, validate_non_empty_string, validate_path, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bulk-follow")]
#[command(about = "Follow every account in a CSV export and add it to a list")]
pub struct CliConfig {
    /// The name of the list to subscribe these people to
    #[arg(long, default_value = "Infosec")]
    pub list_name: String,

    /// The source csv file
    #[arg(long = "file", default_value = "mastodon_infosec_import.csv")]
    pub source_file: String,

    /// The file to write failed accounts to
    #[arg(long, default_value = "retry.csv")]
    pub retry_file: String,

    /// Let the server resolve accounts it has not seen yet
    #[arg(long)]
    pub resolve: bool,

    /// Read and check the source file without contacting the server
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn list_name(&self) -> &str {
        &self.list_name
    }

    fn source_path(&self) -> &str {
        &self.source_file
    }

    fn retry_path(&self) -> &str {
        &self.retry_file
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("list_name", &self.list_name)?;
        validate_path("file", &self.source_file)?;
        validate_path("retry_file", &self.retry_file)?;
        validate_distinct_paths("retry_file", &self.source_file, &self.retry_file)?;
        Ok(())
    }
}
