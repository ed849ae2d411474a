#![cfg_attr(debug_assertions, allow(dead_code))]

mod ram;
mod utils;

pub mod config;
pub mod cpu;
pub mod debugger;
pub mod device;
pub mod host;
pub mod isa;
pub mod load;

pub use config::{EmulatorConfig, EnvCallMode, ram_config};

use crate::{
    debugger::{DebugChannel, DebugError, GdbStub},
    host::{HostCapability, dispatch_host_call},
    isa::riscv::executor::{RV32CPU, StepOutcome},
    load::LoadError,
};

type BoxedChannel = Box<dyn DebugChannel + Send>;

/// A core plus the outside world it talks to: an optional debugger and an optional
/// host bridge.
pub struct Emulator {
    cpu: RV32CPU,
    config: EmulatorConfig,
    debugger: Option<GdbStub<BoxedChannel>>,
    host: Option<Box<dyn HostCapability + Send>>,
    break_pending: bool,
}

impl Emulator {
    pub fn new(mut cpu: RV32CPU, config: EmulatorConfig) -> Self {
        cpu.set_env_call_mode(config.env_call);
        Self {
            cpu,
            config,
            debugger: None,
            host: None,
            break_pending: false,
        }
    }

    /// Build a core sized by `config` and boot a raw binary on it.
    pub fn from_binary(image: &[u8], config: EmulatorConfig) -> Result<Self, LoadError> {
        let mut cpu = RV32CPU::from_config(&config);
        load::bootstrap(&mut cpu, image, &config)?;
        Ok(Self::new(cpu, config))
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn cpu(&self) -> &RV32CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut RV32CPU {
        &mut self.cpu
    }

    /// Route stops to a debugger on `channel`, replacing any previous one.
    pub fn attach_debugger<C>(&mut self, channel: C)
    where
        C: DebugChannel + Send + 'static,
    {
        let channel: BoxedChannel = Box::new(channel);
        self.debugger = Some(GdbStub::new(channel));
        self.break_pending = self.config.break_on_attach;
        log::info!("debugger attached, break on attach: {}", self.break_pending);
    }

    pub fn detach_debugger(&mut self) {
        self.debugger = None;
        self.break_pending = false;
    }

    pub fn has_debugger(&self) -> bool {
        self.debugger.is_some()
    }

    pub fn attach_host<H>(&mut self, host: H)
    where
        H: HostCapability + Send + 'static,
    {
        self.host = Some(Box::new(host));
    }

    fn lose_debugger(&mut self, err: DebugError) {
        log::error!("debugger lost, continuing without it: {}", err);
        self.detach_debugger();
    }

    fn enter_debugger(&mut self, trapped: bool) {
        let Some(stub) = self.debugger.as_mut() else {
            return;
        };
        if let Err(err) = stub.handle_exception(&mut self.cpu, trapped) {
            self.lose_debugger(err);
        }
    }

    fn interrupt_requested(&mut self) -> bool {
        let Some(stub) = self.debugger.as_mut() else {
            return false;
        };
        match stub.poll_interrupt() {
            Ok(hit) => hit,
            Err(err) => {
                self.lose_debugger(err);
                false
            }
        }
    }

    fn serve_host_call(&mut self) {
        match self.host.as_mut() {
            Some(host) => dispatch_host_call(&mut self.cpu, host.as_mut()),
            None => {
                log::warn!("host call without a host bridge attached");
                dispatch_host_call(&mut self.cpu, &mut NoHost);
            }
        }
    }

    /// One iteration of the host loop.
    ///
    /// Returns `None` when the iteration went to a debugger interrupt instead of an
    /// instruction.
    pub fn step(&mut self) -> Option<StepOutcome> {
        if std::mem::take(&mut self.break_pending) {
            self.enter_debugger(false);
        }

        if self.interrupt_requested() {
            self.enter_debugger(false);
            return None;
        }

        let outcome = self.cpu.step();
        match outcome {
            StepOutcome::Continue => {}
            StepOutcome::HostCall => self.serve_host_call(),
            StepOutcome::Trapped(_) => self.enter_debugger(true),
        }
        Some(outcome)
    }

    /// Loop until `done` holds before an iteration. Returns how many instructions ran.
    pub fn run_until<F>(&mut self, mut done: F) -> u64
    where
        F: FnMut(&RV32CPU) -> bool,
    {
        let mut executed = 0;
        while !done(&self.cpu) {
            if self.step().is_some() {
                executed += 1;
            }
        }
        executed
    }

    /// Run forever. Nothing the guest does stops the loop.
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }
}

/// Stand-in used when no host bridge is attached; every request fails.
struct NoHost;

impl HostCapability for NoHost {
    fn open(&mut self, _: &[u8], _: u32, _: u32) -> Result<i32, host::HostError> {
        Err(host::HostError::InvalidArgument)
    }

    fn close(&mut self, fd: i32) -> Result<(), host::HostError> {
        Err(host::HostError::BadFd(fd))
    }

    fn read(&mut self, fd: i32, _: &mut [u8]) -> Result<usize, host::HostError> {
        Err(host::HostError::BadFd(fd))
    }

    fn write(&mut self, fd: i32, _: &[u8]) -> Result<usize, host::HostError> {
        Err(host::HostError::BadFd(fd))
    }

    fn seek(&mut self, fd: i32, _: i32, _: u32, _: u64) -> Result<u64, host::HostError> {
        Err(host::HostError::BadFd(fd))
    }

    fn poll(&mut self, _: &mut [host::PollFd], _: i32) -> Result<usize, host::HostError> {
        Err(host::HostError::InvalidArgument)
    }
}
