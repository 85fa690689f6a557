// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::EntityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Nav,
    Search,
    /// Typing a free-form filter value such as a minimum balance.
    FilterInput,
    CellEdit,
    Broadcast,
}

impl AppMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nav => "NAV",
            Self::Search => "SEARCH",
            Self::FilterInput => "FILTER",
            Self::CellEdit => "EDIT",
            Self::Broadcast => "BROADCAST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: AppMode,
    pub active_tab: EntityKind,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: AppMode::Nav,
            active_tab: EntityKind::Users,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextTab,
    PrevTab,
    SelectTab(EntityKind),
    EnterSearch,
    EnterFilterInput,
    EnterCellEdit,
    OpenBroadcast,
    ExitToNav,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(AppMode),
    TabChanged(EntityKind),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextTab => self.rotate_tab(1),
            AppCommand::PrevTab => self.rotate_tab(-1),
            AppCommand::SelectTab(kind) => {
                if self.active_tab == kind {
                    return Vec::new();
                }
                self.active_tab = kind;
                vec![AppEvent::TabChanged(kind)]
            }
            AppCommand::EnterSearch => self.enter(AppMode::Search),
            AppCommand::EnterFilterInput => self.enter(AppMode::FilterInput),
            AppCommand::EnterCellEdit => self.enter(AppMode::CellEdit),
            AppCommand::OpenBroadcast => self.enter(AppMode::Broadcast),
            AppCommand::ExitToNav => {
                self.mode = AppMode::Nav;
                vec![AppEvent::ModeChanged(self.mode)]
            }
            AppCommand::SetStatus(message) => vec![self.set_status(message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn enter(&mut self, mode: AppMode) -> Vec<AppEvent> {
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn rotate_tab(&mut self, delta: isize) -> Vec<AppEvent> {
        let tabs = EntityKind::ALL;
        let current = tabs
            .iter()
            .position(|tab| *tab == self.active_tab)
            .unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_tab = tabs[next];
        vec![AppEvent::TabChanged(self.active_tab)]
    }

    fn set_status(&mut self, message: String) -> AppEvent {
        self.status_line = Some(message.clone());
        AppEvent::StatusUpdated(message)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppMode, AppState};
    use crate::EntityKind;

    #[test]
    fn tab_rotation_wraps() {
        let mut state = AppState {
            active_tab: EntityKind::VirtualCards,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextTab);
        assert_eq!(state.active_tab, EntityKind::Users);
        assert_eq!(events, vec![AppEvent::TabChanged(EntityKind::Users)]);

        state.dispatch(AppCommand::PrevTab);
        assert_eq!(state.active_tab, EntityKind::VirtualCards);
    }

    #[test]
    fn selecting_the_current_tab_is_silent() {
        let mut state = AppState::default();
        assert!(state.dispatch(AppCommand::SelectTab(EntityKind::Users)).is_empty());
        assert_eq!(
            state.dispatch(AppCommand::SelectTab(EntityKind::Coupons)),
            vec![AppEvent::TabChanged(EntityKind::Coupons)]
        );
    }

    #[test]
    fn status_set_and_clear() {
        let mut state = AppState::default();

        let events = state.dispatch(AppCommand::SetStatus("copied".to_owned()));
        assert_eq!(state.status_line.as_deref(), Some("copied"));
        assert_eq!(events, vec![AppEvent::StatusUpdated("copied".to_owned())]);

        state.dispatch(AppCommand::ClearStatus);
        assert!(state.status_line.is_none());
    }

    #[test]
    fn mode_transitions() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::EnterSearch);
        assert_eq!(state.mode, AppMode::Search);

        state.dispatch(AppCommand::EnterCellEdit);
        assert_eq!(state.mode, AppMode::CellEdit);

        state.dispatch(AppCommand::OpenBroadcast);
        assert_eq!(state.mode, AppMode::Broadcast);
        assert_eq!(state.mode.label(), "BROADCAST");

        state.dispatch(AppCommand::ExitToNav);
        assert_eq!(state.mode, AppMode::Nav);
    }
}
