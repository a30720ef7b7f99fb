//! Hardware-gated session
//!
//! Drives a [`SecurityModule`] through authentication, batched in-place
//! decryption and teardown. The session remembers how far authentication got
//! so teardown only undoes stages that were actually reached.

use crate::core::sector::check_buffer;
use crate::core::{InputError, Result, SessionStage, StatusCode, SECTOR_SIZE};
use crate::domain::repositories::{SecurityModule, MAX_DECRYPT_SECTORS};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Idle,
    AccessorCreated,
    Initialized,
    Authenticated,
}

pub struct SecuritySession {
    module: Box<dyn SecurityModule>,
    state: SessionState,
}

fn stage_error(stage: SessionStage, status: StatusCode) -> InputError {
    error!("Security module {} ({})", stage, status);
    InputError::SecurityModule { stage, status }
}

impl SecuritySession {
    pub fn new(module: Box<dyn SecurityModule>) -> Self {
        Self {
            module,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Runs accessor creation, initialization and key exchange in order.
    /// A retry after a failure resumes at the stage that failed.
    pub fn authenticate(&mut self, descriptor: i32) -> Result<()> {
        if self.state == SessionState::Authenticated {
            return Ok(());
        }

        if self.state < SessionState::AccessorCreated {
            self.module
                .create_accessor()
                .map_err(|s| stage_error(SessionStage::CreateAccessor, s))?;
            self.state = SessionState::AccessorCreated;
        }

        if self.state < SessionState::Initialized {
            self.module
                .initialize()
                .map_err(|s| stage_error(SessionStage::Initialize, s))?;
            self.state = SessionState::Initialized;
        }

        self.module
            .key_exchange(descriptor)
            .map_err(|s| stage_error(SessionStage::KeyExchange, s))?;
        self.state = SessionState::Authenticated;

        debug!("Security session authenticated for descriptor {}", descriptor);
        Ok(())
    }

    /// Decrypts `block_count` sectors of `buffer` in place, at most
    /// `MAX_DECRYPT_SECTORS` per module call.
    pub fn decrypt(&mut self, buffer: &mut [u8], block_count: u32) -> Result<()> {
        if !self.is_authenticated() {
            return Err(InputError::NotAuthenticated);
        }
        check_buffer(block_count, buffer.len())?;

        let mut block = 0u32;
        while block < block_count {
            let batch = (block_count - block).min(MAX_DECRYPT_SECTORS);
            let start = block as usize * SECTOR_SIZE;
            let end = start + batch as usize * SECTOR_SIZE;

            self.module
                .decrypt(&mut buffer[start..end])
                .map_err(|s| stage_error(SessionStage::Decrypt, s))?;

            block += batch;
        }

        Ok(())
    }

    /// Exits the execution environment and destroys the accessor, as far as
    /// they were set up. Failures are logged; the session always ends idle.
    pub fn teardown(&mut self) {
        if self.state >= SessionState::Initialized {
            if let Err(status) = self.module.exit() {
                error!("Security module {} ({})", SessionStage::Exit, status);
            }
        }

        if self.state >= SessionState::AccessorCreated {
            if let Err(status) = self.module.destroy_accessor() {
                error!("Security module {} ({})", SessionStage::DestroyAccessor, status);
            }
        }

        if self.state != SessionState::Idle {
            debug!("Security session torn down");
        }
        self.state = SessionState::Idle;
    }
}
