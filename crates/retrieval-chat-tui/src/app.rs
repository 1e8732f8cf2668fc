use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use retrieval_chat_core::chat::{clear_remote, run_query};
use retrieval_chat_core::{
    ChatSession, Config, HitTarget, MessageId, RetrievalClient, RetrievalError, SearchResponse,
    Submission, WindowChrome,
};
use crate::tui::AppEvent;

/// Smallest panel that still fits a title bar, one transcript line and the input box
const MIN_PANEL: (u16, u16) = (30, 8);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub config: Config,

    // Chat state
    pub chat: ChatSession,
    pub client: RetrievalClient,
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of transcript area for scroll calculations
    pub chat_width: u16,  // Width of transcript area for wrap calculations
    pub status: Option<String>,
    pub history_popup: Option<String>,

    // Window chrome
    pub window: WindowChrome,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub desktop_area: Option<Rect>,
    pub panel_area: Option<Rect>,
    pub title_area: Option<Rect>,
    pub zoom_button_area: Option<Rect>,
    pub clear_button_area: Option<Rect>,
    pub chat_area: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, events: UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        let client = RetrievalClient::new(&config.base_url, config.request_timeout())?;
        let chat = ChatSession::new();
        info!(session = %chat.session_id(), url = client.base_url(), "chat session started");

        Ok(Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            config,

            chat,
            client,
            input: String::new(),
            input_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            status: None,
            history_popup: None,

            window: WindowChrome::new(),

            animation_frame: 0,

            desktop_area: None,
            panel_area: None,
            title_area: None,
            zoom_button_area: None,
            clear_button_area: None,
            chat_area: None,

            events,
        })
    }

    /// Send the input line to the retrieval service.
    pub fn submit_input(&mut self) {
        match self.chat.submit(&self.input) {
            Submission::Ignored => {}
            Submission::Busy => {
                self.status = Some("Still waiting for the previous answer".to_string());
            }
            Submission::Dispatched(pending) => {
                self.input.clear();
                self.input_cursor = 0;
                self.status = None;

                let client = self.client.clone();
                let session_id = self.chat.session_id().clone();
                let params = self.config.search_params();
                let events = self.events.clone();
                debug!(id = pending.id.0, "query dispatched");

                tokio::spawn(async move {
                    let result = run_query(&client, &session_id, &params, &pending).await;
                    let _ = events.send(AppEvent::QueryFinished {
                        id: pending.id,
                        result,
                    });
                });
            }
        }
    }

    pub fn on_query_finished(&mut self, id: MessageId, result: Result<SearchResponse, RetrievalError>) {
        if !self.chat.resolve(id, result) {
            debug!(id = id.0, "dropping result for a cleared placeholder");
        }
    }

    /// Empty the transcript now; tell the service in the background.
    ///
    /// Returns true when an in-flight query was cancelled.
    pub fn clear_chat(&mut self) -> bool {
        let cancelled = self.chat.clear().is_some();
        if cancelled {
            info!("cancelled in-flight query");
        }
        self.chat_scroll = 0;
        self.status = None;

        let client = self.client.clone();
        let session_id = self.chat.session_id().clone();
        tokio::spawn(async move {
            clear_remote(&client, &session_id).await;
        });
        cancelled
    }

    pub fn request_history(&mut self) {
        let client = self.client.clone();
        let session_id = self.chat.session_id().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = client.history(&session_id).await;
            let _ = events.send(AppEvent::HistoryLoaded(result));
        });
    }

    pub fn on_history_loaded(&mut self, result: Result<String, RetrievalError>) {
        self.history_popup = Some(match result {
            Ok(history) if history.trim().is_empty() => "No conversation history yet.".to_string(),
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "failed to load conversation history");
                format!("Error: {}", err)
            }
        });
    }

    pub fn cycle_search_type(&mut self) {
        self.config.search_type = self.config.search_type.next();
        if let Err(err) = Config::save_search_type(self.config.search_type) {
            warn!(error = %err, "could not persist search type");
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Scroll to the newest message if the transcript changed since the last call.
    pub fn follow_transcript(&mut self) {
        if self.chat.take_scroll_request() {
            self.scroll_to_bottom();
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.chat.messages() {
            total_lines = total_lines.saturating_add(1); // Role line ("You:" or "Assistant:")
            let text = if msg.is_pending() {
                "Thinking...".to_string()
            } else {
                msg.display_text()
            };
            for line in text.lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = if char_count == 0 { 1 } else { char_count / wrap_width + 1 };
                total_lines = total_lines.saturating_add(wrapped as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Where the floating panel sits inside `screen`, after zoom and drag.
    ///
    /// The panel is centred, then moved by the window offset and kept fully
    /// on screen.
    pub fn panel_rect(&self, screen: Rect) -> Rect {
        let (w, h, centre_x, centre_y) = self.panel_geometry(screen);
        let max_x = screen.x as i32 + (screen.width - w) as i32;
        let max_y = screen.y as i32 + (screen.height - h) as i32;

        let (dx, dy) = self.window.offset();
        let x = (centre_x + dx).clamp(screen.x as i32, max_x);
        let y = (centre_y + dy).clamp(screen.y as i32, max_y);

        Rect::new(x as u16, y as u16, w, h)
    }

    /// Clip the stored window offset to what `screen` can show.
    pub fn keep_window_on_screen(&mut self, screen: Rect) {
        let (w, h, centre_x, centre_y) = self.panel_geometry(screen);
        let min = (screen.x as i32 - centre_x, screen.y as i32 - centre_y);
        let max = (
            screen.x as i32 + (screen.width - w) as i32 - centre_x,
            screen.y as i32 + (screen.height - h) as i32 - centre_y,
        );
        self.window.clamp_offset(min, max);
    }

    /// Scaled panel size and its centred top-left corner.
    fn panel_geometry(&self, screen: Rect) -> (u16, u16, i32, i32) {
        let base_w = ((screen.width as u32 * 3 / 5) as u16).max(MIN_PANEL.0);
        let base_h = ((screen.height as u32 * 7 / 10) as u16).max(MIN_PANEL.1);
        let (w, h) = self.window.scaled_size(base_w, base_h);
        let w = w.min(screen.width);
        let h = h.min(screen.height);

        let centre_x = screen.x as i32 + (screen.width - w) as i32 / 2;
        let centre_y = screen.y as i32 + (screen.height - h) as i32 / 2;
        (w, h, centre_x, centre_y)
    }

    /// Classify a mouse position against the areas stored by the last render.
    pub fn hit_target(&self, x: u16, y: u16) -> HitTarget {
        let inside = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

        if inside(self.zoom_button_area) || inside(self.clear_button_area) {
            HitTarget::TitleControl
        } else if inside(self.title_area) {
            HitTarget::TitleBar
        } else if inside(self.panel_area) {
            HitTarget::Body
        } else {
            HitTarget::Outside
        }
    }
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}
