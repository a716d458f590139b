//! Native winspool spooler implementation (Windows only).
//!
//! Enumeration returns one buffer holding fixed-size `PRINTER_INFO_2W`
//! records whose string fields point into a trailing region of the same
//! buffer. Every string is copied out into owned values before the buffer
//! drops; no pointer into the buffer survives past the decode step.
#![allow(non_snake_case)]
#![allow(unsafe_code)]

use std::io;
use std::ptr::null_mut;

use tracing::{debug, trace};
use winapi::shared::minwindef::{BOOL, DWORD, FALSE};
use winapi::shared::ntdef::HANDLE;
use winapi::shared::winerror::ERROR_INSUFFICIENT_BUFFER;
use winapi::um::winspool::{
    ClosePrinter, EnumPrintersW, GetPrinterW, OpenPrinterW, SetPrinterW, PRINTER_ALL_ACCESS,
    PRINTER_DEFAULTSW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_INFO_2W,
};

use super::record::PrinterRecord;
use super::Spooler;
use crate::error::{ReadError, RenameError};

/// Spooler talking directly to the winspool API.
pub struct WinspoolSpooler;

impl WinspoolSpooler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WinspoolSpooler {
    fn default() -> Self {
        Self::new()
    }
}

impl Spooler for WinspoolSpooler {
    fn read_printers(&self) -> Result<Vec<PrinterRecord>, ReadError> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: DWORD = 0;
        let mut returned: DWORD = 0;

        // Sizing call: expected to fail with ERROR_INSUFFICIENT_BUFFER and
        // report the byte count the records need. Any other failure (e.g.
        // RPC_S_SERVER_UNAVAILABLE with the spooler service stopped) leaves
        // `needed` at zero and must not read as an empty directory.
        let sized = unsafe {
            EnumPrintersW(
                flags,
                null_mut(),
                2,
                null_mut(),
                0,
                &mut needed,
                &mut returned,
            )
        };
        let bytes = sizing_outcome(sized, last_os_error_code(), needed)?;
        if bytes == 0 {
            debug!("Spooler reported no printers");
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; bytes];
        let ok = unsafe {
            EnumPrintersW(
                flags,
                null_mut(),
                2,
                buffer.as_mut_ptr(),
                needed,
                &mut needed,
                &mut returned,
            )
        };
        if ok == FALSE {
            return Err(ReadError::NativeCallFailed {
                code: last_os_error_code(),
            });
        }

        let mut records = Vec::with_capacity(returned as usize);
        let infos = buffer.as_ptr().cast::<PRINTER_INFO_2W>();
        for i in 0..returned as isize {
            let info = unsafe { &*infos.offset(i) };
            records.push(PrinterRecord::new(
                copy_wide_string(info.pPrinterName),
                copy_wide_string(info.pPortName),
                copy_wide_string(info.pDriverName),
            ));
        }
        trace!(count = records.len(), "Enumerated printers via winspool");
        Ok(records)
        // `buffer` and every pointer into it die here.
    }

    fn rename_printer(&self, old_name: &str, new_name: &str) -> Result<(), RenameError> {
        let wide_old = to_wide(old_name);
        let mut defaults = PRINTER_DEFAULTSW {
            pDataType: null_mut(),
            pDevMode: null_mut(),
            DesiredAccess: PRINTER_ALL_ACCESS,
        };

        let mut raw_handle: HANDLE = null_mut();
        let opened = unsafe {
            OpenPrinterW(
                wide_old.as_ptr() as *mut u16,
                &mut raw_handle,
                &mut defaults,
            )
        };
        if opened == FALSE {
            return Err(RenameError::HandleOpenFailed {
                code: last_os_error_code(),
            });
        }
        // Closed on every exit path from here on.
        let handle = PrinterHandle(raw_handle);

        let mut needed: DWORD = 0;
        unsafe {
            GetPrinterW(handle.0, 2, null_mut(), 0, &mut needed);
        }
        if needed == 0 {
            return Err(RenameError::ConfigFetchFailed {
                code: last_os_error_code(),
            });
        }

        let mut buffer = vec![0u8; needed as usize];
        let fetched =
            unsafe { GetPrinterW(handle.0, 2, buffer.as_mut_ptr(), needed, &mut needed) };
        if fetched == FALSE {
            return Err(RenameError::ConfigFetchFailed {
                code: last_os_error_code(),
            });
        }

        // Overwrite only the name field; every other pointer still refers
        // into `buffer`, which outlives the SetPrinterW call below.
        let wide_new = to_wide(new_name);
        let info = buffer.as_mut_ptr().cast::<PRINTER_INFO_2W>();
        unsafe {
            (*info).pPrinterName = wide_new.as_ptr() as *mut u16;
        }

        let applied = unsafe { SetPrinterW(handle.0, 2, buffer.as_mut_ptr(), 0) };
        if applied == FALSE {
            return Err(RenameError::ConfigSetFailed {
                code: last_os_error_code(),
            });
        }
        debug!(old_name, new_name, "Renamed printer via winspool");
        Ok(())
    }
}

/// Owned printer handle, closed on drop.
struct PrinterHandle(HANDLE);

impl Drop for PrinterHandle {
    fn drop(&mut self) {
        unsafe {
            ClosePrinter(self.0);
        }
    }
}

/// Decide what a sizing call's result means.
///
/// `FALSE` with anything other than `ERROR_INSUFFICIENT_BUFFER` is a real
/// failure and surfaces as [`ReadError::NativeCallFailed`]; only a
/// successful call (zero printers installed) or an insufficient-buffer
/// result may proceed with the reported byte count.
#[allow(clippy::cast_possible_wrap)]
fn sizing_outcome(ok: BOOL, code: i32, needed: DWORD) -> Result<usize, ReadError> {
    if ok == FALSE && code != ERROR_INSUFFICIENT_BUFFER as i32 {
        return Err(ReadError::NativeCallFailed { code });
    }
    Ok(needed as usize)
}

fn last_os_error_code() -> i32 {
    io::Error::last_os_error().raw_os_error().unwrap_or(-1)
}

/// Copy a NUL-terminated wide string out of the enumeration buffer.
///
/// A null pointer decodes to the empty string; the spooler leaves optional
/// fields null.
fn copy_wide_string(p: *const u16) -> String {
    if p.is_null() {
        return String::new();
    }
    let mut len: isize = 0;
    unsafe {
        while *p.offset(len) != 0 {
            len += 1;
        }
        let slice = std::slice::from_raw_parts(p, len as usize);
        String::from_utf16_lossy(slice)
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
