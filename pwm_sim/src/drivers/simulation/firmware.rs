//! Scripted firmware model.
//!
//! The management core is modelled as a list of [`FirmwareOp`]s executed in
//! order once the control line is released. Each op takes `op_cycles` clock
//! cycles; the driver applies the op's effect on the cycle it is fetched.

use super::config::SimulationConfig;
use super::pads::PadMode;
use super::timer::{
    CMPX_OFFSET, CMPY_OFFSET, CTRL_OFFSET, CtrlFlags, PR_OFFSET, PWM0CFG_OFFSET, PWM1CFG_OFFSET,
    PwmFlags, RELOAD_OFFSET,
};
use pwm_common::harness::types::{Level, PadId};
use tracing::debug;

/// One firmware step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirmwareOp {
    /// Busy-wait for extra cycles.
    Delay(u32),
    /// Stage a pad mode.
    ConfigurePad {
        /// Pad to configure
        pad: PadId,
        /// Requested mode
        mode: PadMode,
    },
    /// Apply staged pad modes.
    LoadPadConfigs,
    /// Connect the user project to the pads.
    EnableUserInterface,
    /// Drive the management GPIO (the monitor line).
    MgmtGpio(Level),
    /// Bus write.
    WriteRegister {
        /// Absolute address
        address: u32,
        /// Value written
        value: u32,
    },
    /// Spin forever.
    Halt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecState {
    /// Control line not released yet.
    Held,
    /// Cycles left before the next fetch.
    Waiting(u32),
    Halted,
}

/// Program counter and timing of the firmware.
#[derive(Debug, Clone)]
pub struct FirmwareModel {
    program: Vec<FirmwareOp>,
    pc: usize,
    boot_cycles: u32,
    op_cycles: u32,
    state: ExecState,
}

impl FirmwareModel {
    /// Wrap a program. Execution starts on [`FirmwareModel::release`].
    pub fn new(program: Vec<FirmwareOp>, boot_cycles: u32, op_cycles: u32) -> Self {
        Self {
            program,
            pc: 0,
            boot_cycles,
            op_cycles,
            state: ExecState::Held,
        }
    }

    /// The timer PWM example: configure pads, pulse, set up the timer and
    /// both PWM channels, start it, pulse, spin.
    pub fn timer_pwm_example(config: &SimulationConfig) -> Self {
        let fw = &config.firmware;
        let mut program = vec![FirmwareOp::MgmtGpio(Level::Low)];

        if let Some(wiring) = config.firmware_timer() {
            for pad in [wiring.pwm0_pad, wiring.pwm1_pad] {
                program.push(FirmwareOp::ConfigurePad {
                    pad,
                    mode: PadMode::UserOutput,
                });
            }
        }
        for &pad in &fw.pullup_pads {
            program.push(FirmwareOp::ConfigurePad {
                pad,
                mode: PadMode::InputPullup,
            });
        }
        program.push(FirmwareOp::LoadPadConfigs);
        program.push(FirmwareOp::EnableUserInterface);

        push_pulses(&mut program, fw.ready_pulses);

        if let Some(wiring) = config.firmware_timer() {
            let base = wiring.base;
            let pwm_cfg = |enabled: bool| if enabled { PwmFlags::EN.bits() } else { 0 };
            let ctrl =
                CtrlFlags::EN | CtrlFlags::START | CtrlFlags::PERIODIC | fw.direction.ctrl_bits();
            for (offset, value) in [
                (CTRL_OFFSET, 0),
                (PR_OFFSET, fw.prescaler),
                (RELOAD_OFFSET, fw.reload),
                (CMPX_OFFSET, fw.compare_x),
                (CMPY_OFFSET, fw.compare_y),
                (PWM0CFG_OFFSET, pwm_cfg(fw.pwm0_enabled)),
                (PWM1CFG_OFFSET, pwm_cfg(fw.pwm1_enabled)),
                (CTRL_OFFSET, ctrl.bits()),
            ] {
                program.push(FirmwareOp::WriteRegister {
                    address: base | offset,
                    value,
                });
            }
        }

        push_pulses(&mut program, fw.configured_pulses);
        program.push(FirmwareOp::Halt);

        Self::new(program, config.boot_cycles, config.op_cycles)
    }

    /// Release the core from reset. Has no effect once running.
    pub fn release(&mut self) {
        if self.state == ExecState::Held {
            debug!(
                "Firmware released: {} ops, boot in {} cycles",
                self.program.len(),
                self.boot_cycles
            );
            self.state = ExecState::Waiting(self.boot_cycles);
        }
    }

    /// `true` before [`FirmwareModel::release`].
    pub fn is_held(&self) -> bool {
        self.state == ExecState::Held
    }

    /// `true` once the program has reached `Halt` or run off its end.
    pub fn is_halted(&self) -> bool {
        self.state == ExecState::Halted
    }

    /// The loaded program.
    pub fn program(&self) -> &[FirmwareOp] {
        &self.program
    }

    /// Advance one clock cycle. Returns the op fetched on this cycle, if any.
    pub fn tick(&mut self) -> Option<FirmwareOp> {
        match self.state {
            ExecState::Held | ExecState::Halted => None,
            ExecState::Waiting(n) if n > 1 => {
                self.state = ExecState::Waiting(n - 1);
                None
            }
            ExecState::Waiting(_) => self.fetch(),
        }
    }

    fn fetch(&mut self) -> Option<FirmwareOp> {
        let Some(op) = self.program.get(self.pc).copied() else {
            self.state = ExecState::Halted;
            return None;
        };
        debug!("Firmware op {}: {:?}", self.pc, op);
        self.pc += 1;
        self.state = match op {
            FirmwareOp::Halt => ExecState::Halted,
            FirmwareOp::Delay(cycles) => ExecState::Waiting(self.op_cycles.saturating_add(cycles)),
            _ => ExecState::Waiting(self.op_cycles),
        };
        Some(op)
    }
}

fn push_pulses(program: &mut Vec<FirmwareOp>, count: u32) {
    for _ in 0..count {
        program.push(FirmwareOp::MgmtGpio(Level::High));
        program.push(FirmwareOp::MgmtGpio(Level::Low));
    }
}
