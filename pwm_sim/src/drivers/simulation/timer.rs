//! 32-bit timer with two PWM outputs.
//!
//! Register layout follows the CF_TMR32 peripheral: counter, reload,
//! prescaler, two compare registers, control and per-channel PWM
//! configuration, plus the usual IM/MIS/RIS/IC interrupt block.
//!
//! PWM0 is high while the counter is below `CMPX`, PWM1 while it is below
//! `CMPY`. With `RELOAD = 99` and `CMPX = 50` an up-counting timer produces
//! a 100-cycle period at 50 % duty.

use bitflags::bitflags;
use pwm_common::harness::driver::HarnessError;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Base address of timer 0.
pub const TIMER0_BASE: u32 = 0x3000_0000;
/// Base address of timer 1.
pub const TIMER1_BASE: u32 = 0x3001_0000;

/// Counter value (read-only).
pub const TMR_OFFSET: u32 = 0x0000;
/// Reload / top value.
pub const RELOAD_OFFSET: u32 = 0x0004;
/// Prescaler: the counter steps every `PR + 1` clocks.
pub const PR_OFFSET: u32 = 0x0008;
/// Compare X (PWM0 threshold).
pub const CMPX_OFFSET: u32 = 0x000C;
/// Compare Y (PWM1 threshold).
pub const CMPY_OFFSET: u32 = 0x0010;
/// Control register.
pub const CTRL_OFFSET: u32 = 0x0014;
/// Configuration register.
pub const CFG_OFFSET: u32 = 0x0018;
/// PWM0 configuration.
pub const PWM0CFG_OFFSET: u32 = 0x001C;
/// PWM1 configuration.
pub const PWM1CFG_OFFSET: u32 = 0x0020;
/// Interrupt mask.
pub const IM_OFFSET: u32 = 0xFF00;
/// Masked interrupt status (read-only).
pub const MIS_OFFSET: u32 = 0xFF04;
/// Raw interrupt status (read-only).
pub const RIS_OFFSET: u32 = 0xFF08;
/// Interrupt clear (write-one-to-clear).
pub const IC_OFFSET: u32 = 0xFF0C;
/// Clock gate.
pub const GCLK_OFFSET: u32 = 0xFF10;

/// Timeout (counter wrapped).
pub const IRQ_TO: u32 = 1 << 0;
/// Counter matched CMPX.
pub const IRQ_MX: u32 = 1 << 1;
/// Counter matched CMPY.
pub const IRQ_MY: u32 = 1 << 2;

bitflags! {
    /// Timer control register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CtrlFlags: u32 {
        /// Timer enabled.
        const EN = 1 << 0;
        /// Counting started.
        const START = 1 << 1;
        /// Reload after wrap instead of stopping.
        const PERIODIC = 1 << 2;
        /// Count down.
        const DIR_DOWN = 1 << 3;
        /// Count up, then down.
        const DIR_UPDOWN = 2 << 3;
    }
}

bitflags! {
    /// PWM channel configuration bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PwmFlags: u32 {
        /// Drive the output.
        const EN = 1 << 0;
        /// Invert the output.
        const INV = 1 << 1;
    }
}

/// Counting direction selected by `CTRL[4:3]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountDirection {
    /// 0 → RELOAD, wrap to 0.
    #[default]
    Up,
    /// RELOAD → 0, wrap to RELOAD.
    Down,
    /// 0 → RELOAD → 0.
    UpDown,
}

impl CountDirection {
    fn from_ctrl(ctrl: CtrlFlags) -> Self {
        match (ctrl.bits() >> 3) & 0b11 {
            1 => CountDirection::Down,
            2 => CountDirection::UpDown,
            _ => CountDirection::Up,
        }
    }

    /// Control bits selecting this direction.
    pub const fn ctrl_bits(self) -> CtrlFlags {
        match self {
            CountDirection::Up => CtrlFlags::empty(),
            CountDirection::Down => CtrlFlags::DIR_DOWN,
            CountDirection::UpDown => CtrlFlags::DIR_UPDOWN,
        }
    }
}

/// One timer instance.
#[derive(Debug, Clone)]
pub struct Tmr32 {
    base: u32,
    tmr: u32,
    reload: u32,
    pr: u32,
    cmpx: u32,
    cmpy: u32,
    ctrl: CtrlFlags,
    cfg: u32,
    pwm0cfg: PwmFlags,
    pwm1cfg: PwmFlags,
    im: u32,
    ris: u32,
    gclk: u32,
    /// Clocks since the counter last stepped.
    prescale: u32,
    /// Up-down mode is on its way down.
    descending: bool,
}

impl Tmr32 {
    /// Create a timer in its reset state.
    pub fn new(base: u32) -> Self {
        Self {
            base,
            tmr: 0,
            reload: 0,
            pr: 0,
            cmpx: 0,
            cmpy: 0,
            ctrl: CtrlFlags::empty(),
            cfg: 0,
            pwm0cfg: PwmFlags::empty(),
            pwm1cfg: PwmFlags::empty(),
            im: 0,
            ris: 0,
            gclk: 0,
            prescale: 0,
            descending: false,
        }
    }

    /// Bus base address.
    pub fn base(&self) -> u32 {
        self.base
    }

    /// `true` if `address` falls in this timer's 64 KiB window.
    pub fn decodes(&self, address: u32) -> bool {
        address & 0xFFFF_0000 == self.base
    }

    /// Current counter value.
    pub fn counter(&self) -> u32 {
        self.tmr
    }

    /// `true` while the counter is enabled and started.
    pub fn running(&self) -> bool {
        self.ctrl.contains(CtrlFlags::EN | CtrlFlags::START)
    }

    fn direction(&self) -> CountDirection {
        CountDirection::from_ctrl(self.ctrl)
    }

    /// Register write.
    pub fn write(&mut self, offset: u32, value: u32) -> Result<(), HarnessError> {
        debug!(
            "TMR32@{:#010x} write [{:#06x}] = {:#010x}",
            self.base, offset, value
        );
        match offset {
            RELOAD_OFFSET => self.reload = value,
            PR_OFFSET => self.pr = value,
            CMPX_OFFSET => self.cmpx = value,
            CMPY_OFFSET => self.cmpy = value,
            CTRL_OFFSET => self.write_ctrl(CtrlFlags::from_bits_retain(value)),
            CFG_OFFSET => self.cfg = value,
            PWM0CFG_OFFSET => self.pwm0cfg = PwmFlags::from_bits_retain(value),
            PWM1CFG_OFFSET => self.pwm1cfg = PwmFlags::from_bits_retain(value),
            IM_OFFSET => self.im = value,
            IC_OFFSET => self.ris &= !value,
            GCLK_OFFSET => self.gclk = value,
            _ => {
                return Err(HarnessError::Bus {
                    address: self.base | offset,
                });
            }
        }
        Ok(())
    }

    /// Register read.
    pub fn read(&self, offset: u32) -> Result<u32, HarnessError> {
        let value = match offset {
            TMR_OFFSET => self.tmr,
            RELOAD_OFFSET => self.reload,
            PR_OFFSET => self.pr,
            CMPX_OFFSET => self.cmpx,
            CMPY_OFFSET => self.cmpy,
            CTRL_OFFSET => self.ctrl.bits(),
            CFG_OFFSET => self.cfg,
            PWM0CFG_OFFSET => self.pwm0cfg.bits(),
            PWM1CFG_OFFSET => self.pwm1cfg.bits(),
            IM_OFFSET => self.im,
            MIS_OFFSET => self.ris & self.im,
            RIS_OFFSET => self.ris,
            GCLK_OFFSET => self.gclk,
            _ => {
                return Err(HarnessError::Bus {
                    address: self.base | offset,
                });
            }
        };
        Ok(value)
    }

    fn write_ctrl(&mut self, ctrl: CtrlFlags) {
        let was_running = self.running();
        self.ctrl = ctrl;
        if self.running() && !was_running {
            self.prescale = 0;
            self.descending = false;
            self.tmr = match self.direction() {
                CountDirection::Down => self.reload,
                CountDirection::Up | CountDirection::UpDown => 0,
            };
            debug!(
                "TMR32@{:#010x} started: {:?}, reload={}, pr={}",
                self.base,
                self.direction(),
                self.reload,
                self.pr
            );
        }
    }

    /// Advance by one clock edge.
    pub fn tick(&mut self) {
        if !self.running() {
            return;
        }
        if self.prescale < self.pr {
            self.prescale += 1;
            return;
        }
        self.prescale = 0;

        match self.direction() {
            CountDirection::Up => {
                if self.tmr >= self.reload {
                    self.tmr = 0;
                    self.wrapped();
                } else {
                    self.tmr += 1;
                }
            }
            CountDirection::Down => {
                if self.tmr == 0 {
                    self.tmr = self.reload;
                    self.wrapped();
                } else {
                    self.tmr -= 1;
                }
            }
            CountDirection::UpDown => {
                if self.descending {
                    if self.tmr == 0 {
                        self.descending = false;
                        self.tmr = self.reload.min(1);
                        self.wrapped();
                    } else {
                        self.tmr -= 1;
                    }
                } else if self.tmr >= self.reload {
                    self.descending = true;
                    self.tmr = self.tmr.saturating_sub(1);
                } else {
                    self.tmr += 1;
                }
            }
        }

        if self.tmr == self.cmpx {
            self.ris |= IRQ_MX;
        }
        if self.tmr == self.cmpy {
            self.ris |= IRQ_MY;
        }
    }

    fn wrapped(&mut self) {
        self.ris |= IRQ_TO;
        if !self.ctrl.contains(CtrlFlags::PERIODIC) {
            self.ctrl.remove(CtrlFlags::START);
            trace!("TMR32@{:#010x} one-shot expired", self.base);
        }
    }

    fn pwm_level(&self, cfg: PwmFlags, compare: u32) -> bool {
        if !cfg.contains(PwmFlags::EN) || !self.ctrl.contains(CtrlFlags::EN) {
            return false;
        }
        (self.tmr < compare) ^ cfg.contains(PwmFlags::INV)
    }

    /// Current PWM0 output.
    pub fn pwm0(&self) -> bool {
        self.pwm_level(self.pwm0cfg, self.cmpx)
    }

    /// Current PWM1 output.
    pub fn pwm1(&self) -> bool {
        self.pwm_level(self.pwm1cfg, self.cmpy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(reload: u32, cmpx: u32, cmpy: u32, direction: CountDirection) -> Tmr32 {
        let mut timer = Tmr32::new(TIMER0_BASE);
        timer.write(RELOAD_OFFSET, reload).unwrap();
        timer.write(CMPX_OFFSET, cmpx).unwrap();
        timer.write(CMPY_OFFSET, cmpy).unwrap();
        timer.write(PWM0CFG_OFFSET, PwmFlags::EN.bits()).unwrap();
        timer.write(PWM1CFG_OFFSET, PwmFlags::EN.bits()).unwrap();
        let ctrl = CtrlFlags::EN | CtrlFlags::START | CtrlFlags::PERIODIC | direction.ctrl_bits();
        timer.write(CTRL_OFFSET, ctrl.bits()).unwrap();
        timer
    }

    fn count_high(timer: &mut Tmr32, cycles: u32) -> (u32, u32) {
        let (mut pwm0, mut pwm1) = (0, 0);
        for _ in 0..cycles {
            timer.tick();
            pwm0 += u32::from(timer.pwm0());
            pwm1 += u32::from(timer.pwm1());
        }
        (pwm0, pwm1)
    }

    #[test]
    fn up_counter_duty_matches_compare() {
        let mut timer = configured(99, 50, 25, CountDirection::Up);
        assert_eq!(count_high(&mut timer, 1000), (500, 250));
    }

    #[test]
    fn down_counter_duty_matches_compare() {
        let mut timer = configured(99, 50, 25, CountDirection::Down);
        assert_eq!(count_high(&mut timer, 1000), (500, 250));
    }

    #[test]
    fn prescaler_stretches_period() {
        let mut timer = configured(9, 5, 5, CountDirection::Up);
        timer.write(PR_OFFSET, 1).unwrap();
        let mut previous = timer.counter();
        let mut steps = 0;
        for _ in 0..20 {
            timer.tick();
            if timer.counter() != previous {
                steps += 1;
                previous = timer.counter();
            }
        }
        assert_eq!(steps, 10);
    }

    #[test]
    fn inverted_output() {
        let mut timer = configured(99, 50, 25, CountDirection::Up);
        timer
            .write(PWM1CFG_OFFSET, (PwmFlags::EN | PwmFlags::INV).bits())
            .unwrap();
        assert_eq!(count_high(&mut timer, 1000), (500, 750));
    }

    #[test]
    fn disabled_channel_stays_low() {
        let mut timer = configured(99, 50, 25, CountDirection::Up);
        timer.write(PWM0CFG_OFFSET, 0).unwrap();
        assert_eq!(count_high(&mut timer, 1000).0, 0);
    }

    #[test]
    fn one_shot_stops_after_wrap() {
        let mut timer = configured(9, 5, 5, CountDirection::Up);
        timer
            .write(CTRL_OFFSET, (CtrlFlags::EN | CtrlFlags::START).bits())
            .unwrap();
        for _ in 0..30 {
            timer.tick();
        }
        assert!(!timer.running());
        assert_eq!(timer.read(RIS_OFFSET).unwrap() & IRQ_TO, IRQ_TO);
    }

    #[test]
    fn up_down_visits_both_ends() {
        let mut timer = configured(4, 2, 2, CountDirection::UpDown);
        let mut seen = Vec::new();
        for _ in 0..10 {
            timer.tick();
            seen.push(timer.counter());
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 3, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn interrupt_status_masking_and_clear() {
        let mut timer = configured(3, 1, 2, CountDirection::Up);
        for _ in 0..4 {
            timer.tick();
        }
        assert_eq!(timer.read(RIS_OFFSET).unwrap(), IRQ_TO | IRQ_MX | IRQ_MY);
        assert_eq!(timer.read(MIS_OFFSET).unwrap(), 0);

        timer.write(IM_OFFSET, IRQ_TO).unwrap();
        assert_eq!(timer.read(MIS_OFFSET).unwrap(), IRQ_TO);

        timer.write(IC_OFFSET, IRQ_TO | IRQ_MX).unwrap();
        assert_eq!(timer.read(RIS_OFFSET).unwrap(), IRQ_MY);
    }

    #[test]
    fn unmapped_offset_is_bus_error() {
        let mut timer = Tmr32::new(TIMER1_BASE);
        assert_eq!(
            timer.write(0x0040, 1),
            Err(HarnessError::Bus {
                address: 0x3001_0040
            })
        );
        assert!(timer.write(TMR_OFFSET, 7).is_err());
        assert!(timer.read(0x0100).is_err());
        assert!(timer.decodes(0x3001_0014));
        assert!(!timer.decodes(TIMER0_BASE));
    }
}
