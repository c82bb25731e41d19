//! Top-level session: one host, one speech channel, one mode coordinator.
//!
//! [`Narrator`] is what an embedding shell drives. It forwards render frames to
//! the coordinator, routes key presses to the open mode and, when no mode is
//! open, handles the global shortcuts.

use ratatui::crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info};

use crate::core::host::{check_version, AreaRef, Host, HostError};
use crate::core::modes::coordinator::{ModeCoordinator, OverlapPolicy};
use crate::core::modes::{unmodified, ModeContext, ModeKind};
use crate::core::speech::SpeechChannel;

pub struct Narrator<H: Host> {
    host: H,
    speech: SpeechChannel,
    modes: ModeCoordinator,
}

impl<H: Host> Narrator<H> {
    /// Fails when the host adapter was built for another interface revision.
    pub fn new(host: H, speech: SpeechChannel, policy: OverlapPolicy) -> Result<Self, HostError> {
        check_version(&host)?;
        info!(policy = policy.as_str(), "narrator ready");
        Ok(Self {
            host,
            speech,
            modes: ModeCoordinator::new(policy),
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn speech(&self) -> &SpeechChannel {
        &self.speech
    }

    pub fn speech_mut(&mut self) -> &mut SpeechChannel {
        &mut self.speech
    }

    pub fn modes(&self) -> &ModeCoordinator {
        &self.modes
    }

    pub fn active_mode(&self) -> Option<ModeKind> {
        self.modes.active()
    }

    /// Says the greeting. Also loads the speech driver up front.
    pub fn start(&mut self) {
        self.speech.initialize();
        if self.host.in_game() {
            self.speech.say("Murmur ready");
        } else {
            self.speech.say("Murmur ready. No map loaded");
        }
    }

    /// Render callback; call once per host frame.
    pub fn frame(&mut self) {
        let mut ctx = ModeContext::new(&mut self.host, &mut self.speech);
        self.modes.on_frame(&mut ctx);
    }

    /// Routes a key press. Returns true when something consumed it.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let mut ctx = ModeContext::new(&mut self.host, &mut self.speech);
        if self.modes.handle_input(key, &mut ctx) {
            return true;
        }
        if self.modes.active().is_some() {
            return false;
        }

        let Some(code) = unmodified(key) else {
            return false;
        };
        let entered = match code {
            KeyCode::Char('g') => self.modes.open_commands(&mut ctx),
            KeyCode::Char('G') => self.modes.open_commands_at_cursor(&mut ctx),
            KeyCode::Char('m') => self.modes.open_mod_list(&mut ctx),
            KeyCode::Char('r') => {
                if !ctx.speech.repeat_last() {
                    debug!("nothing to repeat");
                }
                return true;
            }
            KeyCode::Char('t') => {
                self.toggle_transcript();
                return true;
            }
            _ => return false,
        };
        if let Ok(false) = entered {
            debug!(?code, "mode did not open");
        }
        true
    }

    /// Starts painting cells into `area`.
    pub fn expand_area(&mut self, area: AreaRef) -> bool {
        let mut ctx = ModeContext::new(&mut self.host, &mut self.speech);
        self.modes.enter_expand(area, &mut ctx).unwrap_or(false)
    }

    /// Starts removing cells from `area`.
    pub fn shrink_area(&mut self, area: AreaRef) -> bool {
        let mut ctx = ModeContext::new(&mut self.host, &mut self.speech);
        self.modes.enter_shrink(area, &mut ctx).unwrap_or(false)
    }

    /// Closes whatever mode is open, as if the user cancelled it.
    pub fn close_mode(&mut self) {
        let mut ctx = ModeContext::new(&mut self.host, &mut self.speech);
        self.modes.force_close(&mut ctx);
    }

    pub fn set_policy(&mut self, policy: OverlapPolicy) {
        self.modes.set_policy(policy);
    }

    pub fn toggle_transcript(&mut self) {
        let message = match self.speech.transcript_mut() {
            Some(transcript) => transcript.toggle_logging().map_err(|err| err.to_string()),
            None => Err("No transcript file configured".to_string()),
        };
        match message {
            Ok(message) => self.speech.say(message),
            Err(message) => self.speech.urgent(message),
        }
    }

    /// Closes any open mode and releases the speech driver.
    pub fn shutdown(&mut self) {
        self.close_mode();
        self.speech.shutdown();
    }
}
