use std::io;
use std::process::{Command, Stdio};
use thiserror::Error;

const URL_PLACEHOLDER: &str = "{url}";
const TITLE_PLACEHOLDER: &str = "{title}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRequest {
    pub address: String,
    pub title: Option<String>,
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("viewer command is empty")]
    EmptyCommand,
    #[error("no default URL opener on this platform; set viewer_command in the config")]
    #[cfg_attr(
        any(target_os = "linux", target_os = "macos", target_os = "windows"),
        allow(dead_code)
    )]
    Unsupported,
    #[error("failed launching viewer '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Something that can show a web address to the user.
pub trait Viewer {
    fn open(&self, request: &ViewRequest) -> Result<(), ViewerError>;
}

/// Opens addresses with a configured command or the platform's URL opener.
#[derive(Debug, Clone, Default)]
pub struct SystemViewer {
    command: Option<Vec<String>>,
}

impl SystemViewer {
    #[must_use]
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self { command }
    }

    fn argv(&self, request: &ViewRequest) -> Result<Vec<String>, ViewerError> {
        match &self.command {
            Some(template) => expand_template(template, request),
            None => platform_opener(&request.address),
        }
    }
}

impl Viewer for SystemViewer {
    fn open(&self, request: &ViewRequest) -> Result<(), ViewerError> {
        let argv = self.argv(request)?;
        let (program, args) = argv.split_first().ok_or(ViewerError::EmptyCommand)?;

        log::info!(
            "opening {} ({}) with {program}",
            request.address,
            request.title.as_deref().unwrap_or("untitled")
        );
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|source| ViewerError::Spawn {
                program: program.clone(),
                source,
            })
    }
}

fn expand_template(template: &[String], request: &ViewRequest) -> Result<Vec<String>, ViewerError> {
    if template.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(ViewerError::EmptyCommand);
    }

    let title = request.title.as_deref().unwrap_or_default();
    Ok(template
        .iter()
        .map(|arg| {
            arg.replace(URL_PLACEHOLDER, &request.address)
                .replace(TITLE_PLACEHOLDER, title)
        })
        .collect())
}

#[allow(clippy::unnecessary_wraps, clippy::needless_return)]
fn platform_opener(address: &str) -> Result<Vec<String>, ViewerError> {
    #[cfg(target_os = "linux")]
    {
        return Ok(vec!["xdg-open".to_owned(), address.to_owned()]);
    }
    #[cfg(target_os = "macos")]
    {
        return Ok(vec!["open".to_owned(), address.to_owned()]);
    }
    #[cfg(target_os = "windows")]
    {
        return Ok(vec![
            "cmd".to_owned(),
            "/C".to_owned(),
            "start".to_owned(),
            String::new(),
            address.to_owned(),
        ]);
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        let _ = address;
        Err(ViewerError::Unsupported)
    }
}
