//! Tick-counting embassy time driver for single-hart RISC-V parts

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicBool, AtomicU64, Ordering};

const DISARMED: u64 = u64::MAX;

/// Time driver advanced by the board's periodic timer interrupt
///
/// The interrupt must run at `embassy_time::TICK_HZ` and call [`on_tick`].
/// A single alarm is provided, which is all the generic timer queue needs.
pub struct TickDriver {
    ticks: AtomicU64,
    alarm_taken: AtomicBool,
    alarm_at: AtomicU64,
    callback: Mutex<Cell<Option<(fn(*mut ()), usize)>>>,
}

impl TickDriver {
    const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            alarm_taken: AtomicBool::new(false),
            alarm_at: AtomicU64::new(DISARMED),
            callback: Mutex::new(Cell::new(None)),
        }
    }

    fn tick(&self) {
        let now = self.ticks.fetch_add(1, Ordering::Relaxed) + 1;
        if now < self.alarm_at.load(Ordering::Relaxed) {
            return;
        }
        self.alarm_at.store(DISARMED, Ordering::Relaxed);

        let callback = critical_section::with(|cs| self.callback.borrow(cs).get());
        if let Some((callback, ctx)) = callback {
            callback(ctx as *mut ());
        }
    }
}

impl Driver for TickDriver {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        if self.alarm_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(AlarmHandle::new(0))
        }
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, callback: fn(*mut ()), ctx: *mut ()) {
        critical_section::with(|cs| {
            self.callback.borrow(cs).set(Some((callback, ctx as usize)));
        });
    }

    fn set_alarm(&self, _alarm: AlarmHandle, timestamp: u64) -> bool {
        if timestamp <= self.now() {
            self.alarm_at.store(DISARMED, Ordering::Relaxed);
            return false;
        }
        self.alarm_at.store(timestamp, Ordering::Relaxed);
        true
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: TickDriver = TickDriver::new());

/// Advance time by one tick (called from the timer interrupt)
pub fn on_tick() {
    DRIVER.tick();
}

// Critical section for a single hart: mask machine interrupts
critical_section::set_impl!(SingleHartCriticalSection);

struct SingleHartCriticalSection;

unsafe impl critical_section::Impl for SingleHartCriticalSection {
    unsafe fn acquire() -> u8 {
        let was_enabled = riscv::register::mstatus::read().mie();
        riscv::interrupt::disable();
        was_enabled as u8
    }

    unsafe fn release(was_enabled: u8) {
        if was_enabled != 0 {
            riscv::interrupt::enable();
        }
    }
}
