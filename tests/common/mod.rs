//! Test doubles for the storage driver and the security module.
//!
//! Both record every call into a shared log so tests can assert ordering
//! across the two collaborators.

#![allow(dead_code)]

use discin::core::{StatusCode, SECTOR_SIZE};
use discin::domain::entities::DeviceInfo;
use discin::domain::repositories::{SecurityModule, StorageDevice, CONFIG_BLOCK_LEN};
use std::sync::{Arc, Mutex};

pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

/// Medium whose sector `n` is filled with byte `n as u8`.
pub fn numbered_medium(sectors: usize) -> Vec<u8> {
    (0..sectors * SECTOR_SIZE)
        .map(|i| (i / SECTOR_SIZE) as u8)
        .collect()
}

pub struct MockStorage {
    pub log: CallLog,
    pub medium: Vec<u8>,
    pub sector_size: u32,
    pub config: [u8; CONFIG_BLOCK_LEN],
    pub sense: [u8; CONFIG_BLOCK_LEN],
    pub fail: Option<&'static str>,
    pub descriptor: i32,
}

impl MockStorage {
    pub fn new(log: CallLog, sectors: usize) -> Self {
        Self {
            log,
            medium: numbered_medium(sectors),
            sector_size: SECTOR_SIZE as u32,
            config: [0; CONFIG_BLOCK_LEN],
            sense: [0; CONFIG_BLOCK_LEN],
            fail: None,
            descriptor: 7,
        }
    }

    fn step(&self, name: &'static str) -> Result<(), StatusCode> {
        self.log.lock().unwrap().push(format!("storage:{}", name));
        if self.fail == Some(name) {
            Err(StatusCode(0x8001))
        } else {
            Ok(())
        }
    }
}

impl StorageDevice for MockStorage {
    fn device_info(&mut self) -> Result<DeviceInfo, StatusCode> {
        self.step("info")?;
        let total = (self.medium.len() / SECTOR_SIZE) as u32;
        Ok(DeviceInfo::new(self.sector_size, total))
    }

    fn open(&mut self) -> Result<(), StatusCode> {
        self.step("open")
    }

    fn configuration(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode> {
        self.step("configuration")?;
        *buffer = self.config;
        Ok(())
    }

    fn mode_sense(&mut self, buffer: &mut [u8; CONFIG_BLOCK_LEN]) -> Result<(), StatusCode> {
        self.step("mode_sense")?;
        *buffer = self.sense;
        Ok(())
    }

    fn mode_select(&mut self) -> Result<(), StatusCode> {
        self.step("mode_select")
    }

    fn read_sectors(
        &mut self,
        start: u32,
        count: u32,
        buffer: &mut [u8],
    ) -> Result<u32, StatusCode> {
        self.step("read")?;
        let total = (self.medium.len() / SECTOR_SIZE) as u32;
        let delivered = count.min(total.saturating_sub(start));
        let from = start as usize * SECTOR_SIZE;
        let len = delivered as usize * SECTOR_SIZE;
        buffer[..len].copy_from_slice(&self.medium[from..from + len]);
        Ok(delivered)
    }

    fn descriptor(&self) -> i32 {
        self.descriptor
    }

    fn close(&mut self) -> Result<(), StatusCode> {
        self.step("close")
    }
}

/// XORs every byte with `0xA5` and records batch sizes.
pub struct MockModule {
    pub log: CallLog,
    pub fail: Option<&'static str>,
    pub fail_decrypt_call: Option<usize>,
    decrypt_calls: usize,
}

impl MockModule {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail: None,
            fail_decrypt_call: None,
            decrypt_calls: 0,
        }
    }

    pub fn failing(log: CallLog, stage: &'static str) -> Self {
        Self {
            fail: Some(stage),
            ..Self::new(log)
        }
    }

    fn step(&self, name: String, key: &'static str) -> Result<(), StatusCode> {
        self.log.lock().unwrap().push(name);
        if self.fail == Some(key) {
            Err(StatusCode(0x8002_0001u32 as i32))
        } else {
            Ok(())
        }
    }
}

pub const CIPHER_KEY: u8 = 0xA5;

impl SecurityModule for MockModule {
    fn create_accessor(&mut self) -> Result<(), StatusCode> {
        self.step("module:create_accessor".into(), "create_accessor")
    }

    fn initialize(&mut self) -> Result<(), StatusCode> {
        self.step("module:initialize".into(), "initialize")
    }

    fn key_exchange(&mut self, descriptor: i32) -> Result<(), StatusCode> {
        self.step(format!("module:key_exchange:{}", descriptor), "key_exchange")
    }

    fn decrypt(&mut self, data: &mut [u8]) -> Result<(), StatusCode> {
        let call = self.decrypt_calls;
        self.decrypt_calls += 1;
        self.log
            .lock()
            .unwrap()
            .push(format!("module:decrypt:{}", data.len() / SECTOR_SIZE));
        if self.fail_decrypt_call == Some(call) {
            return Err(StatusCode(-1));
        }
        data.iter_mut().for_each(|b| *b ^= CIPHER_KEY);
        Ok(())
    }

    fn exit(&mut self) -> Result<(), StatusCode> {
        self.step("module:exit".into(), "exit")
    }

    fn destroy_accessor(&mut self) -> Result<(), StatusCode> {
        self.step("module:destroy_accessor".into(), "destroy_accessor")
    }
}
