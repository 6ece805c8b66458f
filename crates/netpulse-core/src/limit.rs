// ── Limit editor state machine ──
//
// Closed -> Editing -> Applying -> Closed, with Cancel returning Editing
// straight to Closed. Editing only touches the local draft; the one network
// effect is the `LimitRequest` handed out by `begin_apply`. Clearing a
// limit is a separate direct command and never goes through the editor.

use crate::config::LimitPreset;
use crate::error::CoreError;
use crate::model::{DeviceRecord, LimitRequest, MacAddress};

/// Longest accepted ceiling, in digits.
const MAX_DIGITS: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LimitField {
    #[default]
    Download,
    Upload,
}

impl LimitField {
    fn other(self) -> Self {
        match self {
            Self::Download => Self::Upload,
            Self::Upload => Self::Download,
        }
    }
}

/// Editable ceilings for one device, kept as text while being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDraft {
    pub mac: MacAddress,
    pub label: String,
    pub download: String,
    pub upload: String,
    pub focus: LimitField,
}

impl LimitDraft {
    fn field_mut(&mut self, field: LimitField) -> &mut String {
        match field {
            LimitField::Download => &mut self.download,
            LimitField::Upload => &mut self.upload,
        }
    }

    fn parse(raw: &str, what: &str) -> Result<u64, CoreError> {
        let value: u64 = raw
            .trim()
            .parse()
            .map_err(|_| CoreError::validation(format!("{what} limit is required")))?;
        if value == 0 {
            return Err(CoreError::validation(format!(
                "{what} limit must be greater than 0 kbps"
            )));
        }
        Ok(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LimitState {
    #[default]
    Closed,
    Editing(LimitDraft),
    /// Request sent, waiting for the service to answer.
    Applying { mac: MacAddress },
}

#[derive(Debug, Clone, Default)]
pub struct LimitControl {
    state: LimitState,
}

impl LimitControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LimitState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, LimitState::Closed)
    }

    pub fn draft(&self) -> Option<&LimitDraft> {
        match &self.state {
            LimitState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    fn draft_mut(&mut self) -> Option<&mut LimitDraft> {
        match &mut self.state {
            LimitState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    /// Start editing `device`. Seeds from its active limit where present,
    /// otherwise from `seed`. Ignored while a request is in flight.
    pub fn open(&mut self, device: &DeviceRecord, seed: LimitPreset) {
        if matches!(self.state, LimitState::Applying { .. }) {
            return;
        }
        let active = device.active_limit();
        let download = active
            .and_then(|l| l.download_kbps)
            .unwrap_or(seed.download_kbps);
        let upload = active
            .and_then(|l| l.upload_kbps)
            .unwrap_or(seed.upload_kbps);

        self.state = LimitState::Editing(LimitDraft {
            mac: device.mac.clone(),
            label: device.display_name(),
            download: download.to_string(),
            upload: upload.to_string(),
            focus: LimitField::Download,
        });
    }

    /// Append a digit to the focused field. Non-digits are ignored.
    pub fn push_digit(&mut self, c: char) {
        if !c.is_ascii_digit() {
            return;
        }
        if let Some(draft) = self.draft_mut() {
            let focus = draft.focus;
            let field = draft.field_mut(focus);
            if field.len() < MAX_DIGITS {
                field.push(c);
            }
        }
    }

    pub fn backspace(&mut self) {
        if let Some(draft) = self.draft_mut() {
            let focus = draft.focus;
            draft.field_mut(focus).pop();
        }
    }

    pub fn toggle_focus(&mut self) {
        if let Some(draft) = self.draft_mut() {
            draft.focus = draft.focus.other();
        }
    }

    /// Overwrite both ceilings at once.
    pub fn apply_preset(&mut self, preset: LimitPreset) {
        if let Some(draft) = self.draft_mut() {
            draft.download = preset.download_kbps.to_string();
            draft.upload = preset.upload_kbps.to_string();
        }
    }

    /// Discard the draft.
    pub fn cancel(&mut self) {
        if matches!(self.state, LimitState::Editing(_)) {
            self.state = LimitState::Closed;
        }
    }

    /// Validate the draft and move to Applying. On a validation error the
    /// editor stays open so the user can fix the value.
    pub fn begin_apply(&mut self) -> Result<LimitRequest, CoreError> {
        let Some(draft) = self.draft() else {
            return Err(CoreError::validation("limit editor is not open"));
        };
        let download_kbps = LimitDraft::parse(&draft.download, "Download")?;
        let upload_kbps = LimitDraft::parse(&draft.upload, "Upload")?;
        let mac = draft.mac.clone();

        self.state = LimitState::Applying { mac: mac.clone() };
        Ok(LimitRequest {
            mac,
            enabled: true,
            download_kbps,
            upload_kbps,
        })
    }

    /// Close after the service answered, whatever the answer. The result
    /// is handed back for one-shot display; there is no retry.
    pub fn finish(&mut self, result: Result<(), CoreError>) -> Result<(), CoreError> {
        self.state = LimitState::Closed;
        result
    }
}
