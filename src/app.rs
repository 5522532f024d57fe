use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::{info, warn};
use ratatui::layout::Rect;

use crate::error::Error;
use crate::models::Token;
use crate::parser::tokens_to_json;
use crate::render::render;
use crate::system::{edit_in_editor, set_clipboard};
use crate::template::TemplateBuffer;

const DOUBLE_CLICK_MS: u128 = 400;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Tokens,
    Template,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Column {
    Name,
    Value,
}

#[derive(Clone, Debug)]
pub(crate) struct StatusMessage {
    pub(crate) text: String,
    pub(crate) since: Instant,
}

#[derive(Clone, Debug)]
pub(crate) struct App {
    pub(crate) tokens: Vec<Token>,
    pub(crate) template: TemplateBuffer,
    pub(crate) focus: Focus,
    pub(crate) active_token: usize,
    pub(crate) active_column: Column,
    pub(crate) token_scroll: usize,
    pub(crate) tokens_area: Rect,
    pub(crate) template_area: Rect,
    pub(crate) row_height: u16,
    pub(crate) last_click: Option<(usize, Instant)>,
    pub(crate) status: Option<StatusMessage>,
    pub(crate) editor_command: Option<String>,
    pub(crate) should_quit: bool,
    pub(crate) needs_redraw: bool,
}

impl App {
    /// Starts a session. An empty token list gets one blank token so the form
    /// always has a field to type into.
    pub(crate) fn new(template: &str, mut tokens: Vec<Token>, editor_command: Option<String>) -> Self {
        if tokens.is_empty() {
            tokens.push(Token::new());
        }
        let focus = if template.is_empty() {
            Focus::Tokens
        } else {
            Focus::Template
        };
        Self {
            tokens,
            template: TemplateBuffer::from_text(template),
            focus,
            active_token: 0,
            active_column: Column::Name,
            token_scroll: 0,
            tokens_area: Rect::default(),
            template_area: Rect::default(),
            row_height: 3,
            last_click: None,
            status: None,
            editor_command,
            should_quit: false,
            needs_redraw: false,
        }
    }

    pub(crate) fn flattened_template(&self) -> String {
        self.template.flatten(&self.tokens)
    }

    pub(crate) fn rendered(&self) -> String {
        render(&self.flattened_template(), &self.tokens)
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.copy_output(),
                KeyCode::Char('t') => self.copy_tokens(),
                KeyCode::Char('n') => self.add_token(),
                KeyCode::Char('d') => self.remove_active_token(),
                KeyCode::Char('b') => self.insert_active_bubble(),
                KeyCode::Char('e') => self.open_template_in_editor(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::F(2) => self.toggle_focus(),
            _ => match self.focus {
                Focus::Tokens => self.on_key_tokens(key),
                Focus::Template => self.on_key_template(key),
            },
        }
    }

    fn on_key_tokens(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.prev_field(),
            KeyCode::Enter => self.insert_active_bubble(),
            KeyCode::Backspace => {
                if let Some(field) = self.active_field_mut() {
                    field.pop();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(field) = self.active_field_mut() {
                    field.push(ch);
                }
            }
            _ => {}
        }
    }

    fn on_key_template(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.template.push_char('\n'),
            KeyCode::Tab => self.template.push_char('\t'),
            KeyCode::Backspace => self.template.backspace(),
            KeyCode::Char(ch) => self.template.push_char(ch),
            _ => {}
        }
    }

    pub(crate) fn on_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if contains(self.template_area, mouse.column, mouse.row) {
            self.focus = Focus::Template;
            return;
        }
        let Some((index, column)) = self.field_from_mouse(mouse) else {
            return;
        };
        self.focus = Focus::Tokens;
        self.active_token = index;
        self.active_column = column;

        let now = Instant::now();
        if let Some((last_index, last_time)) = self.last_click {
            if last_index == index && last_time.elapsed().as_millis() <= DOUBLE_CLICK_MS {
                self.insert_active_bubble();
                self.last_click = None;
                return;
            }
        }
        self.last_click = Some((index, now));
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tokens => Focus::Template,
            Focus::Template => Focus::Tokens,
        };
    }

    fn active_field_mut(&mut self) -> Option<&mut String> {
        let column = self.active_column;
        self.tokens
            .get_mut(self.active_token)
            .map(|token| match column {
                Column::Name => &mut token.name,
                Column::Value => &mut token.value,
            })
    }

    fn next_field(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        match self.active_column {
            Column::Name => self.active_column = Column::Value,
            Column::Value => {
                self.active_column = Column::Name;
                self.active_token = (self.active_token + 1) % self.tokens.len();
            }
        }
    }

    fn prev_field(&mut self) {
        if self.tokens.is_empty() {
            return;
        }
        match self.active_column {
            Column::Value => self.active_column = Column::Name,
            Column::Name => {
                self.active_column = Column::Value;
                if self.active_token == 0 {
                    self.active_token = self.tokens.len() - 1;
                } else {
                    self.active_token -= 1;
                }
            }
        }
    }

    fn add_token(&mut self) {
        self.tokens.push(Token::new());
        self.active_token = self.tokens.len() - 1;
        self.active_column = Column::Name;
        self.focus = Focus::Tokens;
    }

    fn remove_active_token(&mut self) {
        if self.active_token >= self.tokens.len() {
            return;
        }
        let removed = self.tokens.remove(self.active_token);
        self.template.remove_bubbles(&removed.id);
        self.active_token = self.active_token.min(self.tokens.len().saturating_sub(1));
        self.active_column = Column::Name;
        self.set_status(&format!("Removed {}", removed.label()));
    }

    fn insert_active_bubble(&mut self) {
        let Some(token) = self.tokens.get(self.active_token) else {
            return;
        };
        let id = token.id.clone();
        self.template.insert_bubble(&id);
        self.focus = Focus::Template;
    }

    fn copy_output(&mut self) {
        let rendered = self.rendered();
        match set_clipboard(&rendered) {
            Ok(()) => {
                info!("event=copy_output status=ok bytes={}", rendered.len());
                self.set_status("Copied output");
            }
            Err(err) => {
                warn!("event=copy_output status=error error={err}");
                self.set_status(&err.to_string());
            }
        }
    }

    fn copy_tokens(&mut self) {
        let result = tokens_to_json(&self.tokens)
            .map_err(Error::from)
            .and_then(|json| set_clipboard(&json));
        match result {
            Ok(()) => self.set_status("Copied tokens JSON"),
            Err(err) => {
                warn!("event=copy_tokens status=error error={err}");
                self.set_status(&err.to_string());
            }
        }
    }

    fn open_template_in_editor(&mut self) {
        let Some(editor) = self.editor_command.clone() else {
            self.set_status("EDITOR is not set");
            return;
        };
        let current = self.flattened_template();
        let result = edit_in_editor(&editor, &current);
        self.needs_redraw = true;
        match result {
            Ok(text) => {
                self.template = TemplateBuffer::from_text(&text);
                self.focus = Focus::Template;
                self.set_status("Template updated");
            }
            Err(err) => {
                warn!("event=external_edit status=error error={err}");
                self.set_status(&err.to_string());
            }
        }
    }

    fn field_from_mouse(&self, mouse: MouseEvent) -> Option<(usize, Column)> {
        let area = self.tokens_area;
        if area.width == 0 || area.height == 0 || self.row_height == 0 {
            return None;
        }
        if !contains(area, mouse.column, mouse.row) {
            return None;
        }
        let row_offset = ((mouse.row - area.y) / self.row_height) as usize;
        let index = self.token_scroll + row_offset;
        if index >= self.tokens.len() {
            return None;
        }
        let column = if mouse.column < area.x + area.width / 2 {
            Column::Name
        } else {
            Column::Value
        };
        Some((index, column))
    }

    fn set_status(&mut self, text: &str) {
        self.status = Some(StatusMessage {
            text: text.to_string(),
            since: Instant::now(),
        });
    }
}

fn contains(area: Rect, column: u16, row: u16) -> bool {
    area.width > 0
        && area.height > 0
        && column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, ch: char) {
        app.on_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL));
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.on_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    #[test]
    fn new_session_has_one_blank_token() {
        let app = App::new("", Vec::new(), None);
        assert_eq!(app.tokens.len(), 1);
        assert_eq!(app.focus, Focus::Tokens);
        assert_eq!(app.rendered(), "");
    }

    #[test]
    fn typing_fills_name_then_value() {
        let mut app = App::new("", Vec::new(), None);
        type_text(&mut app, "First Name");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Adx");
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "a");
        assert_eq!(app.tokens[0].name, "First Name");
        assert_eq!(app.tokens[0].value, "Ada");
    }

    #[test]
    fn bubble_renders_with_token_value() {
        let mut app = App::new("", Vec::new(), None);
        type_text(&mut app, "who");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "world");

        press(&mut app, KeyCode::F(2));
        type_text(&mut app, "Hello ");
        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.focus, Focus::Template);
        type_text(&mut app, "!");

        assert_eq!(app.flattened_template(), "Hello {{who}} !");
        assert_eq!(app.rendered(), "Hello world !");
    }

    #[test]
    fn renaming_token_updates_its_bubbles() {
        let mut app = App::new("", vec![Token::with_fields("a", "1")], None);
        ctrl(&mut app, 'b');
        assert_eq!(app.flattened_template(), "{{a}} ");
        app.tokens[0].name = "Renamed Token".to_string();
        assert_eq!(app.flattened_template(), "{{renamed_token}} ");
        assert_eq!(app.rendered(), "1 ");
    }

    #[test]
    fn field_navigation_wraps_both_ways() {
        let tokens = vec![Token::with_fields("a", ""), Token::with_fields("b", "")];
        let mut app = App::new("", tokens, None);
        press(&mut app, KeyCode::BackTab);
        assert_eq!((app.active_token, app.active_column), (1, Column::Value));
        press(&mut app, KeyCode::Tab);
        assert_eq!((app.active_token, app.active_column), (0, Column::Name));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!((app.active_token, app.active_column), (1, Column::Name));
    }

    #[test]
    fn add_and_remove_tokens() {
        let mut app = App::new("", vec![Token::with_fields("a", "1")], None);
        ctrl(&mut app, 'b');
        ctrl(&mut app, 'n');
        assert_eq!(app.tokens.len(), 2);
        assert_eq!(app.active_token, 1);
        assert_eq!(app.focus, Focus::Tokens);

        app.active_token = 0;
        ctrl(&mut app, 'd');
        assert_eq!(app.tokens.len(), 1);
        assert_eq!(app.active_token, 0);
        assert_eq!(app.flattened_template(), " ");

        ctrl(&mut app, 'd');
        assert!(app.tokens.is_empty());
        ctrl(&mut app, 'd');
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "ignored");
        assert!(app.tokens.is_empty());
    }

    #[test]
    fn template_keys_edit_template() {
        let mut app = App::new("x", Vec::new(), None);
        assert_eq!(app.focus, Focus::Template);
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "yz");
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.flattened_template(), "x\ny");
    }

    #[test]
    fn escape_quits() {
        let mut app = App::new("", Vec::new(), None);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn external_edit_without_editor_sets_status() {
        let mut app = App::new("", Vec::new(), None);
        ctrl(&mut app, 'e');
        let status = app.status.as_ref().map(|status| status.text.as_str());
        assert_eq!(status, Some("EDITOR is not set"));
    }

    #[test]
    fn mouse_selects_field_and_double_click_inserts_bubble() {
        let tokens = vec![Token::with_fields("a", "1"), Token::with_fields("b", "2")];
        let mut app = App::new("", tokens, None);
        app.tokens_area = Rect::new(1, 1, 20, 9);
        app.template_area = Rect::new(30, 1, 20, 9);

        click(&mut app, 15, 4);
        assert_eq!((app.active_token, app.active_column), (1, Column::Value));
        assert!(app.template.is_empty());

        click(&mut app, 15, 4);
        assert_eq!(app.flattened_template(), "{{b}} ");
        assert_eq!(app.focus, Focus::Template);

        click(&mut app, 2, 9);
        assert_eq!(app.active_token, 1);

        app.focus = Focus::Tokens;
        click(&mut app, 35, 2);
        assert_eq!(app.focus, Focus::Template);
    }
}
