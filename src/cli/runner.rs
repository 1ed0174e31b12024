//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::operations::{builtin_operations, load_operation, JsonOperation};
use crate::pagination::{PageFetcher, PagedQuery, PagingOptions};
use crate::types::{JsonObject, JsonValue};
use serde_json::json;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List => self.list_operations(),
            Commands::Show { operation } => self.show(operation),
            Commands::Run {
                operation,
                filters,
                max_items,
                page_size,
                starting_token,
                no_auto_iterate,
            } => {
                let mut options = PagingOptions::new();
                if let Some(max) = max_items {
                    options = options.with_max_items(*max);
                }
                if let Some(size) = page_size {
                    options = options.with_page_size(*size);
                }
                if let Some(token) = starting_token {
                    options = options.with_starting_token(token.clone());
                }
                if *no_auto_iterate {
                    options = options.manual();
                }

                let filters: JsonObject = filters.iter().cloned().collect();
                self.run_operation(operation, filters, options).await
            }
        }
    }

    /// Resolve client configuration
    ///
    /// Precedence: command-line flags, then environment, then the config file.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => ClientConfig::load(path)?,
            None => ClientConfig::default(),
        }
        .with_env_overrides();

        if let Some(region) = &self.cli.region {
            config.region.clone_from(region);
        }
        if let Some(endpoint) = &self.cli.endpoint_url {
            config.endpoint_url = Some(endpoint.clone());
        }

        config.validate()?;
        Ok(config)
    }

    /// Run an operation until it stops, printing items as pages arrive
    async fn run_operation(
        &self,
        name: &str,
        filters: JsonObject,
        options: PagingOptions,
    ) -> Result<()> {
        let def = load_operation(name)?;
        let config = self.client_config()?;
        let operation = JsonOperation::from_config(def, &config)?.with_filters(filters)?;
        debug!(?operation, "Resolved operation");

        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, cancelling after the in-flight request");
                on_signal.cancel();
            }
        });

        let query = PagedQuery::new(operation, options).with_cancellation(cancel);
        let mut stdout = std::io::stdout();
        let result = self.write_query(query, &mut stdout).await;
        signal_task.abort();
        result
    }

    /// Drain a query into `out`
    ///
    /// Items are written as each page arrives. In manual mode the next token
    /// follows the items. A failure is returned after the items already
    /// written.
    pub async fn write_query<F, W>(&self, mut query: PagedQuery<F>, out: &mut W) -> Result<()>
    where
        F: PageFetcher<Item = JsonValue>,
        W: Write,
    {
        let manual = !query.options().is_auto();

        while let Some(page) = query.next_page().await {
            let items = page?;
            for item in &items {
                self.write_value(out, item)?;
            }
            out.flush()?;
        }

        if manual {
            self.write_value(out, &json!({ "NextToken": query.next_token() }))?;
        }

        Ok(())
    }

    /// List built-in operations
    fn list_operations(&self) -> Result<()> {
        let mut stdout = std::io::stdout();
        for op in builtin_operations()? {
            let entry = json!({
                "name": op.name,
                "service": op.service.to_string(),
                "description": op.description,
                "max_page_size": op.cursor.max_page_size,
                "required_filters": op.required_filters,
            });
            self.write_value(&mut stdout, &entry)?;
        }
        Ok(())
    }

    /// Show an operation definition
    fn show(&self, name: &str) -> Result<()> {
        let def = load_operation(name)?;
        let value = serde_json::to_value(&def)?;
        self.write_value(&mut std::io::stdout(), &value)
    }

    /// Write one value in the selected format
    fn write_value<W: Write>(&self, out: &mut W, value: &JsonValue) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        writeln!(out, "{text}").map_err(Error::Io)
    }
}
