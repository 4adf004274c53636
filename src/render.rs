//! PDF rendering.
//!
//! The HTML document is handed to an external renderer over the
//! filesystem: write the document and stylesheet to a scratch
//! directory, invoke the renderer, read the PDF back.

use std::path::Path;
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;

use crate::html::{self, StyleSheet};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("renderer exited with {status}:\n{stderr}")]
    Failed { status: String, stderr: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Turns an HTML document into PDF bytes.
#[allow(async_fn_in_trait)]
pub trait RenderEngine {
    async fn render(&self, html: &str, sheet: &StyleSheet) -> Result<Vec<u8>, RenderError>;
}

/// Renders through the `weasyprint` command line tool.
pub struct WeasyPrint {
    program: String,
}

impl Default for WeasyPrint {
    fn default() -> Self {
        Self {
            program: "weasyprint".to_string(),
        }
    }
}

impl WeasyPrint {
    async fn run(&self, html_path: &Path, css_path: &Path, pdf_path: &Path) -> Result<Output, RenderError> {
        Command::new(&self.program)
            .arg(html_path)
            .arg(pdf_path)
            .arg("--stylesheet")
            .arg(css_path)
            .arg("--presentational-hints")
            .output()
            .await
            .map_err(|source| RenderError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

impl RenderEngine for WeasyPrint {
    async fn render(&self, html: &str, sheet: &StyleSheet) -> Result<Vec<u8>, RenderError> {
        let dir = tempfile::tempdir()?;
        let html_path = dir.path().join("document.html");
        let css_path = dir.path().join("document.css");
        let pdf_path = dir.path().join("document.pdf");
        tokio::fs::write(&html_path, html).await?;
        tokio::fs::write(&css_path, html::stylesheet_css(sheet)).await?;

        let output = self.run(&html_path, &css_path, &pdf_path).await?;
        if !output.status.success() {
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(tokio::fs::read(&pdf_path).await?)
    }
}
