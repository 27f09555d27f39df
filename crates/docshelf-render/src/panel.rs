//! Panel controller: expand/collapse handling for a rendered catalogue.
//!
//! The handlers are modelled as a small state machine that returns the
//! effects a browser should perform. The browser side lives in
//! [`crate::runtime`], which applies the same rules with the page's
//! collapse framework.

use std::time::Duration;

/// How long the scroll-into-view animation runs.
pub const SCROLL_DURATION: Duration = Duration::from_millis(500);

/// Orientation of a panel's chevron indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chevron {
    Up,
    Down,
}

impl Chevron {
    /// CSS class showing this orientation.
    pub fn class(&self) -> &'static str {
        match self {
            Chevron::Up => "glyphicon-chevron-up",
            Chevron::Down => "glyphicon-chevron-down",
        }
    }
}

/// Whether a panel's detail table is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

/// A change the page should make in response to a panel event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEffect {
    /// Swap the chevron of the panel header
    SetChevron { panel_id: String, chevron: Chevron },

    /// Smoothly scroll the page to an element
    ScrollTo { anchor: String, duration: Duration },

    /// Start the expand transition of a collapse target
    Expand { target: String },
}

/// Handlers attached to one rendered panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelBinding {
    tag: String,
    panel_id: String,
    container_id: String,
    show: bool,
    state: PanelState,
}

impl PanelBinding {
    /// Bind the handlers of `panel_id`, rendered into the container `container_id`.
    pub fn new(
        tag: impl Into<String>,
        panel_id: impl Into<String>,
        container_id: impl Into<String>,
        show: bool,
    ) -> Self {
        Self {
            tag: tag.into(),
            panel_id: panel_id.into(),
            container_id: container_id.into(),
            show,
            state: PanelState::Collapsed,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn panel_id(&self) -> &str {
        &self.panel_id
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn show(&self) -> bool {
        self.show
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    /// Id of the element the collapse framework toggles.
    pub fn collapse_target(&self) -> String {
        format!("{}1", self.panel_id)
    }

    /// Effects to apply once the handlers are attached.
    pub fn attach(&self) -> Vec<PanelEffect> {
        if self.show {
            vec![PanelEffect::Expand {
                target: self.collapse_target(),
            }]
        } else {
            Vec::new()
        }
    }

    /// The expand transition finished.
    pub fn on_shown(&mut self) -> Vec<PanelEffect> {
        self.state = PanelState::Expanded;
        vec![
            PanelEffect::SetChevron {
                panel_id: self.panel_id.clone(),
                chevron: Chevron::Down,
            },
            PanelEffect::ScrollTo {
                anchor: self.container_id.clone(),
                duration: SCROLL_DURATION,
            },
        ]
    }

    /// The collapse transition finished.
    pub fn on_hidden(&mut self) -> Vec<PanelEffect> {
        self.state = PanelState::Collapsed;
        vec![PanelEffect::SetChevron {
            panel_id: self.panel_id.clone(),
            chevron: Chevron::Up,
        }]
    }

    /// Script line attaching these handlers through the panel runtime.
    pub fn script(&self) -> String {
        format!(
            "docshelf.bind({}, {}, {});",
            js_string(&self.tag),
            js_string(&self.panel_id),
            self.show
        )
    }
}

/// Quote a string as a JavaScript literal that is safe inside `<script>`.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::from(value)
        .to_string()
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(show: bool) -> PanelBinding {
        PanelBinding::new("5_1", "RTEMS_5_1", "rtems-catalogue-5_1", show)
    }

    #[test]
    fn expand_turns_chevron_down_and_scrolls() {
        let mut panel = binding(false);

        let effects = panel.on_shown();

        assert_eq!(panel.state(), PanelState::Expanded);
        assert_eq!(
            effects,
            vec![
                PanelEffect::SetChevron {
                    panel_id: "RTEMS_5_1".to_string(),
                    chevron: Chevron::Down,
                },
                PanelEffect::ScrollTo {
                    anchor: "rtems-catalogue-5_1".to_string(),
                    duration: Duration::from_millis(500),
                },
            ]
        );
    }

    #[test]
    fn collapse_turns_chevron_back_up() {
        let mut panel = binding(false);
        panel.on_shown();

        let effects = panel.on_hidden();

        assert_eq!(panel.state(), PanelState::Collapsed);
        assert_eq!(
            effects,
            vec![PanelEffect::SetChevron {
                panel_id: "RTEMS_5_1".to_string(),
                chevron: Chevron::Up,
            }]
        );
    }

    #[test]
    fn show_expands_on_attach() {
        assert_eq!(
            binding(true).attach(),
            vec![PanelEffect::Expand {
                target: "RTEMS_5_11".to_string()
            }]
        );
        assert!(binding(false).attach().is_empty());
    }

    #[test]
    fn script_quotes_arguments() {
        let panel = PanelBinding::new("a\"b", "</script>", "c", true);

        assert_eq!(
            panel.script(),
            r#"docshelf.bind("a\"b", "<\/script>", true);"#
        );
    }
}
