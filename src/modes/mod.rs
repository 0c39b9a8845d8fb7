//! modes
//! Unauthenticated block-cipher modes, all operating in place on the job
//! buffer: AES CBC/CNTR/ECB/DOCSIS-BPI and DES/3DES CBC plus DOCSIS-DES.

pub mod aes_modes;
pub mod des_modes;
