//! Immutable interpreter configuration, validated once at startup

use crate::action::ActionTable;
use crate::error::ConfigError;
use crate::input::{ButtonMap, ButtonTable};
use crate::script::{AppRegistry, Application};
use crate::types::{AppId, TimingConfig};

/// Applications, their special actions, button maps and timing
///
/// Built once and passed by reference into the interpreter.
#[derive(Debug)]
pub struct MacroConfig<'a, A> {
    registry: AppRegistry<'a>,
    actions: ActionTable<'a, A>,
    buttons: ButtonTable<'a>,
    timing: TimingConfig,
}

impl<'a, A> MacroConfig<'a, A> {
    /// Cross-check the parts against each other
    pub fn new(
        registry: AppRegistry<'a>,
        actions: ActionTable<'a, A>,
        buttons: ButtonTable<'a>,
        timing: TimingConfig,
    ) -> Result<Self, ConfigError> {
        TimingConfig::new(
            timing.key_press_ms,
            timing.click_press_ms,
            timing.step_gap_ms,
            timing.settle_ms,
            timing.poll_interval_ms,
            timing.action_timeout_ms,
        )?;

        if let Some(app) = actions.apps().find(|&app| registry.find(app).is_none()) {
            return Err(ConfigError::UnknownApplication(app));
        }

        for app in registry.iter() {
            for (script, row) in app.scripts().enumerate() {
                for index in row.special_indices() {
                    if actions.get(app.id(), index).is_none() {
                        return Err(ConfigError::UnknownAction {
                            app: app.id(),
                            script,
                            index,
                        });
                    }
                }
            }
        }

        for (id, map) in buttons {
            let app = registry
                .find(*id)
                .ok_or(ConfigError::UnknownApplication(*id))?;
            if let Some((line, command)) = map
                .entries()
                .find(|&(_, command)| command as usize >= app.script_count())
            {
                return Err(ConfigError::UnknownCommand {
                    app: *id,
                    line,
                    command,
                });
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "configuration ready: {} applications, {} button maps",
            registry.len(),
            buttons.len()
        );

        Ok(Self {
            registry,
            actions,
            buttons,
            timing,
        })
    }

    pub fn registry(&self) -> &AppRegistry<'a> {
        &self.registry
    }

    pub fn actions(&self) -> &ActionTable<'a, A> {
        &self.actions
    }

    pub fn application(&self, app: AppId) -> Option<&Application<'a>> {
        self.registry.find(app)
    }

    pub fn button_map(&self, app: AppId) -> Option<&ButtonMap> {
        self.buttons
            .iter()
            .find(|(id, _)| *id == app)
            .map(|(_, map)| map)
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }
}
