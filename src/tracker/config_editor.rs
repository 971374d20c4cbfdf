//! Editor for the round templates new pipelines are built from.
//!
//! Orders are swapped pairwise on move and are not renumbered on delete
//! unless the editor is configured to, so gaps can appear. Moves work on
//! the sorted position and tolerate gaps; `renumber` compacts to `1..=n`.

use validator::Validate;

use crate::{
    models::{
        round::InterviewRound,
        round_config::{
            CreateRoundConfigRequest, DurationInput, InterviewRoundConfig, MoveDirection,
            RoundConfigField,
        },
    },
    tracker::error::TrackerError,
};

pub const DEFAULT_DURATION_MINUTES: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorOptions {
    pub default_duration: i32,
    pub renumber_on_delete: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION_MINUTES,
            renumber_on_delete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfigEditor {
    entries: Vec<InterviewRoundConfig>,
    options: EditorOptions,
}

impl RoundConfigEditor {
    pub fn new(entries: Vec<InterviewRoundConfig>, options: EditorOptions) -> Self {
        let mut entries = entries;
        entries.sort_by_key(|entry| (entry.order, entry.id));
        Self { entries, options }
    }

    /// Entries sorted by order.
    pub fn entries(&self) -> &[InterviewRoundConfig] {
        &self.entries
    }

    pub fn get(&self, id: i32) -> Result<&InterviewRoundConfig, TrackerError> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| TrackerError::not_found("round config", id))
    }

    pub fn add_round(
        &mut self,
        request: CreateRoundConfigRequest,
    ) -> Result<InterviewRoundConfig, TrackerError> {
        request.validate()?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(TrackerError::validation("name", "name must not be blank"));
        }
        let interviewer = request.interviewer.trim();
        if interviewer.is_empty() {
            return Err(TrackerError::validation(
                "interviewer",
                "interviewer must not be blank",
            ));
        }

        let duration = match request.duration {
            None => self.options.default_duration,
            Some(DurationInput::Minutes(minutes)) if minutes > 0 => minutes,
            Some(DurationInput::Minutes(minutes)) => {
                return Err(TrackerError::validation(
                    "duration",
                    format!("duration must be positive, got {}", minutes),
                ))
            }
            Some(DurationInput::Text(text)) => match text.trim().parse::<i32>() {
                Ok(minutes) if minutes > 0 => minutes,
                _ => {
                    return Err(TrackerError::validation(
                        "duration",
                        format!("'{}' is not a number of minutes", text),
                    ))
                }
            },
        };

        let config = InterviewRoundConfig {
            id: self.entries.iter().map(|e| e.id).max().unwrap_or(0) + 1,
            name: name.to_string(),
            description: request.description.trim().to_string(),
            duration,
            interviewer: interviewer.to_string(),
            is_required: request.is_required,
            order: self.entries.iter().map(|e| e.order).max().unwrap_or(0) + 1,
        };

        self.entries.push(config.clone());
        Ok(config)
    }

    /// Sets one field from its form value. Numeric and boolean fields are
    /// coerced; an unparseable duration falls back to the default.
    pub fn update_field(
        &mut self,
        id: i32,
        field: RoundConfigField,
        value: &str,
    ) -> Result<InterviewRoundConfig, TrackerError> {
        let default_duration = self.options.default_duration;
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| TrackerError::not_found("round config", id))?;

        match field {
            RoundConfigField::Name => entry.name = value.to_string(),
            RoundConfigField::Description => entry.description = value.to_string(),
            RoundConfigField::Interviewer => entry.interviewer = value.to_string(),
            RoundConfigField::Duration => {
                entry.duration = value
                    .trim()
                    .parse::<i32>()
                    .ok()
                    .filter(|minutes| *minutes > 0)
                    .unwrap_or(default_duration);
            }
            RoundConfigField::IsRequired => {
                entry.is_required = matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "true" | "1" | "yes" | "on"
                );
            }
        }

        Ok(entry.clone())
    }

    pub fn delete_round(&mut self, id: i32) -> Result<InterviewRoundConfig, TrackerError> {
        let index = self.position(id)?;
        let removed = self.entries.remove(index);
        if self.options.renumber_on_delete {
            self.renumber();
        }
        Ok(removed)
    }

    /// Swaps order with the previous entry. Returns false at the top.
    pub fn move_up(&mut self, id: i32) -> Result<bool, TrackerError> {
        let index = self.position(id)?;
        if index == 0 {
            return Ok(false);
        }
        self.swap_orders(index - 1, index);
        Ok(true)
    }

    /// Swaps order with the next entry. Returns false at the bottom.
    pub fn move_down(&mut self, id: i32) -> Result<bool, TrackerError> {
        let index = self.position(id)?;
        if index + 1 >= self.entries.len() {
            return Ok(false);
        }
        self.swap_orders(index, index + 1);
        Ok(true)
    }

    pub fn move_round(&mut self, id: i32, direction: MoveDirection) -> Result<bool, TrackerError> {
        match direction {
            MoveDirection::Up => self.move_up(id),
            MoveDirection::Down => self.move_down(id),
        }
    }

    /// Compacts orders to `1..=n` keeping the current sequence.
    pub fn renumber(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.order = index as i32 + 1;
        }
    }

    pub fn has_gaps(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(index, entry)| entry.order != index as i32 + 1)
    }

    /// Fresh pending rounds for a new pipeline, numbered `1..=n` in template
    /// order regardless of gaps.
    pub fn instantiate(&self, include_optional: bool) -> Vec<InterviewRound> {
        self.entries
            .iter()
            .filter(|entry| include_optional || entry.is_required)
            .enumerate()
            .map(|(index, entry)| {
                let position = index as i32 + 1;
                InterviewRound::new(
                    position,
                    position,
                    entry.name.clone(),
                    entry.interviewer.clone(),
                )
            })
            .collect()
    }

    fn position(&self, id: i32) -> Result<usize, TrackerError> {
        self.entries
            .iter()
            .position(|entry| entry.id == id)
            .ok_or_else(|| TrackerError::not_found("round config", id))
    }

    /// Entries stay sorted by order, so swapping orders of neighbours also
    /// swaps their positions.
    fn swap_orders(&mut self, upper: usize, lower: usize) {
        let upper_order = self.entries[upper].order;
        self.entries[upper].order = self.entries[lower].order;
        self.entries[lower].order = upper_order;
        self.entries.swap(upper, lower);
    }
}
