use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::Command;

use arboard::Clipboard;
use crossterm::cursor::MoveTo;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;

use crate::error::Error;

/// Reads a file, or standard input when `path` is `-`.
pub(crate) fn read_input(path: &Path) -> Result<String, Error> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(Error::Stdin)?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|err| Error::io("read", path, err))
}

/// Lets the user edit `text` in an external editor and returns the result.
///
/// The terminal leaves raw mode and the alternate screen while the editor
/// runs and is restored afterwards, even when the editor fails.
pub(crate) fn edit_in_editor(editor: &str, text: &str) -> Result<String, Error> {
    let mut parts = editor.split_whitespace();
    let command = parts
        .next()
        .ok_or_else(|| Error::Editor("EDITOR is empty".to_string()))?
        .to_string();
    let args: Vec<String> = parts.map(|part| part.to_string()).collect();

    let file = tempfile::Builder::new()
        .prefix("tokenforge-")
        .suffix(".txt")
        .tempfile()
        .map_err(|err| Error::io("create", std::env::temp_dir(), err))?;
    let path = file.path().to_path_buf();
    fs::write(&path, text).map_err(|err| Error::io("write", &path, err))?;

    disable_raw_mode().map_err(Error::Terminal)?;
    execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture).map_err(Error::Terminal)?;

    let status_result = Command::new(&command).args(&args).arg(&path).status();

    let restore_result = execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        Clear(ClearType::All),
        MoveTo(0, 0)
    )
    .and_then(|_| enable_raw_mode())
    .map_err(Error::Terminal);

    let status = status_result
        .map_err(|err| Error::Editor(format!("could not start `{command}`: {err}")))?;
    restore_result?;
    if !status.success() {
        return Err(Error::Editor(format!("`{command}` exited with {status}")));
    }

    let edited = fs::read_to_string(&path).map_err(|err| Error::io("read", &path, err))?;
    info!("event=external_edit status=ok editor={command} bytes={}", edited.len());
    Ok(edited)
}

pub(crate) fn set_clipboard(text: &str) -> Result<(), Error> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    Ok(())
}
