//! Script interpreter: input polling, command resolution and step execution

use embassy_futures::select::{select, Either};

use crate::action::{ActionContext, SpecialAction};
use crate::config::MacroConfig;
use crate::error::{EngineError, ScriptError};
use crate::hal::{Delay, DigitalInputs, HidTransport};
use crate::input::{AppSelector, ConnectionTracker, InputSampler};
use crate::port::HidPort;
use crate::script::Script;
use crate::types::{ActionOutcome, AppId, ConnectionHandle, EngineState, Step};

/// Why a script stopped
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Termination {
    /// Reached a `NONE` code
    EndMarker,
    /// Ran past the last step slot
    Exhausted,
    /// A special action returned `Fail` or timed out
    ActionFailed,
    /// A special action returned `EndScript`
    ActionEnded,
    /// Decoding hit a malformed code
    Malformed(ScriptError),
}

/// Summary of one executed script
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunReport {
    pub app: AppId,
    pub command: u8,
    /// Steps executed, terminator excluded
    pub steps: usize,
    /// Steps skipped on request of a special action
    pub skipped: usize,
    /// Reports handed to the transport
    pub sends: usize,
    /// Highest code slot read
    pub last_slot: usize,
    pub termination: Termination,
}

/// The interpreter
///
/// Holds the configuration by reference; the transport handle and the
/// application selection are read from shared atomics every time they are
/// needed.
pub struct MacroEngine<'c, A, T, I, D> {
    config: &'c MacroConfig<'c, A>,
    port: HidPort<T, D>,
    inputs: I,
    connection: &'c ConnectionTracker,
    selector: &'c AppSelector,
    sampler: InputSampler,
    state: EngineState,
}

impl<'c, A, T, I, D> MacroEngine<'c, A, T, I, D>
where
    A: SpecialAction,
    T: HidTransport,
    I: DigitalInputs,
    D: Delay + Clone,
{
    pub fn new(
        config: &'c MacroConfig<'c, A>,
        transport: T,
        inputs: I,
        delay: D,
        connection: &'c ConnectionTracker,
        selector: &'c AppSelector,
    ) -> Self {
        Self {
            port: HidPort::new(transport, delay, config.timing()),
            config,
            inputs,
            connection,
            selector,
            sampler: InputSampler::new(),
            state: EngineState::AwaitInput,
        }
    }

    /// Get current interpreter state
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn port(&self) -> &HidPort<T, D> {
        &self.port
    }

    pub fn inputs(&self) -> &I {
        &self.inputs
    }

    /// Wait for a mapped press, run its script to completion, settle.
    ///
    /// A press is only looked for between scripts; input seen while a script
    /// runs is ignored.
    pub async fn run_cycle(&mut self) -> Result<RunReport, EngineError> {
        self.transition(EngineState::AwaitInput);

        let (app, command) = loop {
            self.port.pause(self.config.timing().poll_interval_ms).await;

            let app = self.selector.current();
            let Some(map) = self.config.button_map(app) else {
                continue;
            };
            if self.sampler.sample(&mut self.inputs, map) {
                if let Some(resolution) = self.sampler.take() {
                    #[cfg(feature = "defmt")]
                    defmt::info!(
                        "line {} resolved to command {} of app {}",
                        resolution.line,
                        resolution.command,
                        app
                    );
                    break (app, resolution.command);
                }
            }
        };

        self.run_command(app, command).await
    }

    /// Run one script directly, bypassing the input sampler
    pub async fn run_command(&mut self, app: AppId, command: u8) -> Result<RunReport, EngineError> {
        let config = self.config;
        let script = config
            .application(app)
            .ok_or(EngineError::UnknownApplication(app))?
            .script(command)
            .ok_or(EngineError::UnknownCommand { app, command })?;

        let report = self.execute(app, command, script).await;

        self.transition(EngineState::Done);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "script {} of app {} done: {} steps, {} sends, {}",
            command,
            app,
            report.steps,
            report.sends,
            report.termination
        );

        self.port.pause(config.timing().settle_ms).await;
        self.transition(EngineState::AwaitInput);
        Ok(report)
    }

    /// Run forever
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(_error) = self.run_cycle().await {
                #[cfg(feature = "defmt")]
                defmt::warn!("command rejected: {}", _error);
            }
        }
    }

    async fn execute(&mut self, app: AppId, command: u8, script: &'c Script<'c>) -> RunReport {
        let sends_before = self.port.sends();
        let step_gap_ms = self.config.timing().step_gap_ms;

        let mut report = RunReport {
            app,
            command,
            steps: 0,
            skipped: 0,
            sends: 0,
            last_slot: 0,
            termination: Termination::Exhausted,
        };
        let mut skip_next = false;

        self.transition(EngineState::ExecutingStep);

        for item in script.steps() {
            let (slot, step) = match item {
                Ok(decoded) => decoded,
                Err(error) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("app {} script {}: {}", app, command, error);
                    report.termination = Termination::Malformed(error);
                    break;
                }
            };
            report.last_slot = slot + step.width() - 1;

            if step == Step::End {
                report.termination = Termination::EndMarker;
                break;
            }
            if skip_next {
                skip_next = false;
                report.skipped += 1;

                #[cfg(feature = "defmt")]
                defmt::debug!("skipping step at slot {}", slot);
                continue;
            }

            let conn = self.connection.current();
            let stop = match step {
                Step::End => None,
                Step::Key(key) => {
                    self.transition(EngineState::StepSingleKey);
                    self.port.tap(conn, 0, key).await;
                    None
                }
                Step::Combo(combo) => {
                    self.transition(EngineState::StepCombo);
                    self.port.chord(conn, 0, combo.keys()).await;
                    None
                }
                Step::Click(button) => {
                    self.transition(EngineState::StepClick);
                    self.port.click(conn, button).await;
                    None
                }
                Step::Special(index) => {
                    self.transition(EngineState::StepSpecial);
                    match self.invoke_special(app, index, script, slot, conn).await {
                        ActionOutcome::Ok => None,
                        ActionOutcome::SkipNext => {
                            skip_next = true;
                            None
                        }
                        ActionOutcome::Fail => Some(Termination::ActionFailed),
                        ActionOutcome::EndScript => Some(Termination::ActionEnded),
                    }
                }
            };

            #[cfg(feature = "defmt")]
            defmt::debug!("slot {} executed", slot);

            report.steps += 1;
            self.transition(EngineState::ExecutingStep);
            self.port.pause(step_gap_ms).await;

            if let Some(termination) = stop {
                report.termination = termination;
                break;
            }
        }

        report.sends = self.port.sends() - sends_before;
        report
    }

    async fn invoke_special(
        &mut self,
        app: AppId,
        index: u8,
        script: &Script<'_>,
        cursor: usize,
        connection: ConnectionHandle,
    ) -> ActionOutcome {
        let config = self.config;
        let Some(slot) = config.actions().get(app, index) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("app {} has no special action {}", app, index);
            return ActionOutcome::Fail;
        };

        let ctx = ActionContext {
            app,
            index,
            host_script: script.codes(),
            cursor,
            connection,
            arg1: slot.arg1,
            arg2: slot.arg2,
        };

        let mut timer = self.port.delay().clone();
        let timeout_ms = config.timing().action_timeout_ms;
        let raced = select(
            slot.action.invoke(&ctx, &mut self.port),
            timer.delay_ms(timeout_ms),
        )
        .await;

        match raced {
            Either::First(outcome) => outcome,
            Either::Second(()) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("special action {} of app {} timed out", index, app);
                // the action may have stopped between a press and its release
                self.port.release_all(connection);
                ActionOutcome::Fail
            }
        }
    }

    fn transition(&mut self, next: EngineState) {
        #[cfg(feature = "defmt")]
        if self.state != next {
            defmt::trace!("{} -> {}", self.state, next);
        }
        self.state = next;
    }
}

/// Interpreter loop on the embassy timer: wait for boot, then run forever
#[cfg(feature = "embassy-time")]
pub async fn macro_task<A, T, I>(
    config: &MacroConfig<'_, A>,
    transport: T,
    inputs: I,
    connection: &ConnectionTracker,
    selector: &AppSelector,
) -> !
where
    A: SpecialAction,
    T: HidTransport,
    I: DigitalInputs,
{
    use crate::hal::EmbassyDelay;

    #[cfg(feature = "defmt")]
    defmt::info!("macro task started");

    let mut delay = EmbassyDelay;
    delay.delay_ms(config.timing().startup_ms).await;

    let mut engine = MacroEngine::new(config, transport, inputs, delay, connection, selector);
    engine.run().await
}
