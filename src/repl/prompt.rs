//! Prompt showing the selected namespace

use std::borrow::Cow;

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

use super::shared_state::SharedState;

/// Prompt reading the current database and collection on every render
pub struct NamespacePrompt {
    state: SharedState,
}

impl NamespacePrompt {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl Prompt for NamespacePrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        let location = match self.state.namespace() {
            Some(namespace) => namespace.to_string(),
            None => self.state.get_database(),
        };
        if self.state.is_connected() {
            format!("{}> ", location).into()
        } else {
            format!("{} (disconnected)> ", location).into()
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_prompt() {
        let state = SharedState::new("mongodb://localhost", "test");
        state.set_connected(true);
        let prompt = NamespacePrompt::new(state);
        assert_eq!(prompt.render_prompt_left(), "test> ");
    }

    #[test]
    fn test_collection_prompt_follows_state() {
        let state = SharedState::new("mongodb://localhost", "shop");
        let prompt = NamespacePrompt::new(state.clone());
        assert_eq!(prompt.render_prompt_left(), "shop (disconnected)> ");

        state.set_connected(true);
        state.set_collection(Some("orders".to_string()));
        assert_eq!(prompt.render_prompt_left(), "shop.orders> ");
    }

    #[test]
    fn test_indicators() {
        let prompt = NamespacePrompt::new(SharedState::new("mongodb://localhost", "test"));
        assert_eq!(prompt.render_prompt_right(), "");
        assert_eq!(prompt.render_prompt_indicator(PromptEditMode::Default), "");
        assert_eq!(prompt.render_prompt_multiline_indicator(), "... ");
    }
}
