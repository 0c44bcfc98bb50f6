//! Recording doubles for the command engine and the interrupt controller.

use std::cell::RefCell;
use std::rc::Rc;

use crate::descriptor::FlashDescriptor;
use crate::detect::JedecId;
use crate::engine::{DecodeConfig, DecodeSnapshot, EncryptionState, FlashEngine};
use crate::irq::InterruptControl;
use crate::types::{Error, IoMode};

const MEMORY_BYTES: usize = 64 * 1024;

pub(crate) fn test_descriptor() -> FlashDescriptor {
    FlashDescriptor::common_spi_nor("mock-1mib", JedecId::from_raw(0x1440EF), 1024 * 1024)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Event {
    IrqDisable,
    IrqEnable,
    Suspend { encrypted: bool },
    Resume { encrypted: bool },
    ReadJedec,
    RawRead { addr: u32, len: usize },
    RawWrite {
        part: &'static str,
        addr: u32,
        data: Vec<u8>,
    },
    RawErase { start: u32, end: u32 },
    ReadRcv { cmd: u8 },
    WriteRcv { cmd: u8, value: u8 },
    SaveDecode,
    RestoreDecode(DecodeConfig),
    ForceDecode(DecodeConfig),
}

#[derive(Default)]
struct Log {
    events: Vec<Event>,
    masked: bool,
}

/// Event log shared by [`MockEngine`] and [`MockIrq`].
#[derive(Clone, Default)]
pub(crate) struct Recorder {
    inner: Rc<RefCell<Log>>,
}

impl Recorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.inner.borrow().events.clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.inner.borrow().events.iter().filter(|e| pred(e)).count()
    }

    pub(crate) fn clear(&self) {
        self.inner.borrow_mut().events.clear();
    }

    pub(crate) fn masked(&self) -> bool {
        self.inner.borrow().masked
    }

    pub(crate) fn set_masked(&self, masked: bool) {
        self.inner.borrow_mut().masked = masked;
    }

    fn push(&self, event: Event) {
        self.inner.borrow_mut().events.push(event);
    }
}

pub(crate) struct MockIrq {
    rec: Recorder,
}

impl MockIrq {
    pub(crate) fn new(rec: &Recorder) -> Self {
        Self { rec: rec.clone() }
    }
}

impl InterruptControl for MockIrq {
    fn disable(&mut self) -> Result<(), Error> {
        if self.rec.masked() {
            return Err(Error::Reentrant);
        }
        self.rec.set_masked(true);
        self.rec.push(Event::IrqDisable);
        Ok(())
    }

    fn enable(&mut self) {
        self.rec.set_masked(false);
        self.rec.push(Event::IrqEnable);
    }
}

pub(crate) struct MockEngine {
    rec: Recorder,
    pub(crate) jedec: Result<JedecId, Error>,
    pub(crate) encrypted: bool,
    pub(crate) decode_active: bool,
    pub(crate) decode: DecodeConfig,
    pub(crate) memory: Vec<u8>,
    pub(crate) raw_error: Option<Error>,
    pub(crate) save_error: Option<Error>,
    pub(crate) rcv_register: u8,
    pub(crate) rcv_error: Option<Error>,
    /// Accept RCV writes without changing the register.
    pub(crate) rcv_write_ignored: bool,
    unmasked_commands: usize,
    unsuspended_commands: usize,
}

impl MockEngine {
    pub(crate) fn new(rec: &Recorder) -> Self {
        Self {
            rec: rec.clone(),
            jedec: Ok(JedecId::from_raw(0x1840EF)),
            encrypted: false,
            decode_active: true,
            decode: DecodeConfig {
                io_mode: IoMode::DualIo,
                continuous_read: false,
                image_offset: 0x2000,
                read_len: 64,
            },
            memory: vec![0xFF; MEMORY_BYTES],
            raw_error: None,
            save_error: None,
            rcv_register: 0,
            rcv_error: None,
            rcv_write_ignored: false,
            unmasked_commands: 0,
            unsuspended_commands: 0,
        }
    }

    /// Everything observable about the decode path.
    pub(crate) fn decode_active_state(&self) -> (bool, bool, DecodeConfig) {
        (self.decode_active, self.encrypted, self.decode)
    }

    pub(crate) fn saw_only_masked_commands(&self) -> bool {
        self.unmasked_commands == 0
    }

    pub(crate) fn saw_only_suspended_commands(&self) -> bool {
        self.unsuspended_commands == 0
    }

    fn command(&mut self, event: Event) {
        if !self.rec.masked() {
            self.unmasked_commands += 1;
        }
        self.rec.push(event);
    }

    fn bus_command(&mut self, event: Event) {
        if self.decode_active {
            self.unsuspended_commands += 1;
        }
        self.command(event);
    }

    fn clamp(&self, addr: u32, len: usize) -> core::ops::Range<usize> {
        let start = (addr as usize).min(self.memory.len());
        let end = start.saturating_add(len).min(self.memory.len());
        start..end
    }
}

impl FlashEngine for MockEngine {
    fn read_jedec_id(&mut self) -> Result<JedecId, Error> {
        self.bus_command(Event::ReadJedec);
        self.jedec
    }

    fn suspend_decode(&mut self) -> EncryptionState {
        self.rec.push(Event::Suspend {
            encrypted: self.encrypted,
        });
        self.decode_active = false;
        EncryptionState::new(self.encrypted)
    }

    fn resume_decode(&mut self, state: EncryptionState) {
        self.rec.push(Event::Resume {
            encrypted: state.enabled(),
        });
        self.encrypted = state.enabled();
        self.decode_active = true;
    }

    fn raw_read(
        &mut self,
        _descriptor: &FlashDescriptor,
        addr: u32,
        out: &mut [u8],
    ) -> Result<(), Error> {
        self.bus_command(Event::RawRead {
            addr,
            len: out.len(),
        });
        if let Some(err) = self.raw_error {
            return Err(err);
        }
        let range = self.clamp(addr, out.len());
        let n = range.len();
        out[..n].copy_from_slice(&self.memory[range]);
        Ok(())
    }

    fn raw_write(
        &mut self,
        descriptor: &FlashDescriptor,
        addr: u32,
        data: &[u8],
    ) -> Result<(), Error> {
        self.bus_command(Event::RawWrite {
            part: descriptor.name,
            addr,
            data: data.to_vec(),
        });
        if let Some(err) = self.raw_error {
            return Err(err);
        }
        let range = self.clamp(addr, data.len());
        let n = range.len();
        for (cell, byte) in self.memory[range].iter_mut().zip(&data[..n]) {
            *cell &= *byte;
        }
        Ok(())
    }

    fn raw_erase(
        &mut self,
        _descriptor: &FlashDescriptor,
        start: u32,
        end: u32,
    ) -> Result<(), Error> {
        self.bus_command(Event::RawErase { start, end });
        if let Some(err) = self.raw_error {
            return Err(err);
        }
        if end >= start {
            let range = self.clamp(start, (end - start) as usize + 1);
            self.memory[range].fill(0xFF);
        }
        Ok(())
    }

    fn read_rcv_register(&mut self, _descriptor: &FlashDescriptor, cmd: u8) -> Result<u8, Error> {
        self.command(Event::ReadRcv { cmd });
        match self.rcv_error {
            Some(err) => Err(err),
            None => Ok(self.rcv_register),
        }
    }

    fn write_rcv_register(
        &mut self,
        _descriptor: &FlashDescriptor,
        cmd: u8,
        value: u8,
    ) -> Result<(), Error> {
        self.command(Event::WriteRcv { cmd, value });
        if let Some(err) = self.rcv_error {
            return Err(err);
        }
        if !self.rcv_write_ignored {
            self.rcv_register = value;
        }
        Ok(())
    }

    fn save_decode_state(&mut self, _descriptor: &FlashDescriptor) -> Result<DecodeSnapshot, Error> {
        self.command(Event::SaveDecode);
        if let Some(err) = self.save_error {
            return Err(err);
        }
        Ok(DecodeSnapshot::new(self.decode))
    }

    fn restore_decode_state(&mut self, _descriptor: &FlashDescriptor, snapshot: DecodeSnapshot) {
        self.command(Event::RestoreDecode(snapshot.config));
        self.decode = snapshot.config;
    }

    fn force_decode_config(&mut self, _descriptor: &FlashDescriptor, config: DecodeConfig) {
        self.command(Event::ForceDecode(config));
        self.decode = config;
    }
}
