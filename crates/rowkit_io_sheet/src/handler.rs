//! Single-consumption output handlers.
//!
//! A handler owns a finished document plus the temp resources behind it.
//! The first transfer marks it consumed; whatever the outcome, the resources
//! are released and every later transfer fails with
//! [`SheetError::AlreadyConsumed`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use rowkit_io_fs::TempResourceContainer;
use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::crypt::encrypt_workbook_agile;
use crate::error::SheetError;
use crate::spec::SpecWriteReport;
use crate::writer::derive_xlsx_write_error;

////////////////////////////////////////////////////////////////////////////////
// #region XlsxOutputHandler

/// Finished workbook awaiting transfer.
pub struct XlsxOutputHandler {
    workbook: Option<Workbook>,
    temp: TempResourceContainer,
    report: SpecWriteReport,
    if_consumed: bool,
}

impl XlsxOutputHandler {
    pub(crate) fn new(workbook: Workbook, temp: TempResourceContainer, report: SpecWriteReport) -> Self {
        Self {
            workbook: Some(workbook),
            temp,
            report,
            if_consumed: false,
        }
    }

    /// Report of the write call that produced this workbook.
    pub fn report(&self) -> &SpecWriteReport {
        &self.report
    }

    /// Whether a transfer was already attempted.
    pub fn is_consumed(&self) -> bool {
        self.if_consumed
    }

    /// Serialize the workbook into `sink`.
    pub fn consume<W: Write + Send>(&mut self, sink: W) -> Result<(), SheetError> {
        let mut workbook = self.take_workbook()?;
        let result = workbook
            .save_to_writer(sink)
            .map_err(derive_xlsx_write_error);
        drop(workbook);
        self.release();
        result?;

        debug!(n_rows = self.report.n_rows, "workbook transferred");
        Ok(())
    }

    /// Serialize the workbook, encrypt it with `password` and write the
    /// encrypted container into `sink`.
    ///
    /// A blank password is rejected without consuming the handler.
    pub fn consume_with_password<W: Write>(
        &mut self,
        mut sink: W,
        password: &str,
    ) -> Result<(), SheetError> {
        if self.if_consumed {
            return Err(SheetError::AlreadyConsumed);
        }
        if password.trim().is_empty() {
            return Err(SheetError::InvalidArgument(
                "Password cannot be null or blank".to_string(),
            ));
        }

        let mut workbook = self.take_workbook()?;
        let result = workbook
            .save_to_buffer()
            .map_err(derive_xlsx_write_error)
            .and_then(|v_plain| encrypt_workbook_agile(&v_plain, password))
            .and_then(|v_encrypted| {
                sink.write_all(&v_encrypted)?;
                sink.flush()?;
                Ok(v_encrypted.len())
            });
        drop(workbook);
        self.release();
        let n_bytes = result?;

        debug!(n_bytes, "encrypted workbook transferred");
        Ok(())
    }

    /// Write the workbook to a file at `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), SheetError> {
        if self.if_consumed {
            return Err(SheetError::AlreadyConsumed);
        }
        let file = File::create(path.as_ref())?;
        self.consume(BufWriter::new(file))
    }

    fn take_workbook(&mut self) -> Result<Workbook, SheetError> {
        if self.if_consumed {
            return Err(SheetError::AlreadyConsumed);
        }
        self.if_consumed = true;
        self.workbook.take().ok_or(SheetError::AlreadyConsumed)
    }

    fn release(&mut self) {
        self.workbook = None;
        self.temp.close();
    }
}

impl std::fmt::Debug for XlsxOutputHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxOutputHandler")
            .field("report", &self.report)
            .field("if_consumed", &self.if_consumed)
            .finish_non_exhaustive()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CsvOutputHandler

/// Spooled CSV file awaiting transfer.
#[derive(Debug)]
pub struct CsvOutputHandler {
    temp: TempResourceContainer,
    report: SpecWriteReport,
    if_consumed: bool,
}

impl CsvOutputHandler {
    pub(crate) fn new(temp: TempResourceContainer, report: SpecWriteReport) -> Self {
        Self {
            temp,
            report,
            if_consumed: false,
        }
    }

    /// Report of the write call that produced this file.
    pub fn report(&self) -> &SpecWriteReport {
        &self.report
    }

    /// Whether a transfer was already attempted.
    pub fn is_consumed(&self) -> bool {
        self.if_consumed
    }

    /// Path of the spooled file while it still exists.
    pub fn path_file(&self) -> Option<&Path> {
        self.temp.path_file()
    }

    /// Copy the spooled file into `sink`, then delete it.
    pub fn consume<W: Write>(&mut self, mut sink: W) -> Result<(), SheetError> {
        if self.if_consumed {
            return Err(SheetError::AlreadyConsumed);
        }
        self.if_consumed = true;

        let result = self.transfer(&mut sink);
        self.temp.close();
        let n_bytes = result?;

        debug!(n_bytes, "csv transferred");
        Ok(())
    }

    /// Write the CSV to a file at `path`.
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), SheetError> {
        if self.if_consumed {
            return Err(SheetError::AlreadyConsumed);
        }
        let file = File::create(path.as_ref())?;
        self.consume(BufWriter::new(file))
    }

    fn transfer<W: Write>(&self, sink: &mut W) -> Result<u64, SheetError> {
        let path_file = self.temp.path_file().ok_or_else(|| {
            SheetError::DocumentWrite("spooled csv file is not available".to_string())
        })?;
        let mut file = File::open(path_file)?;
        let n_bytes = std::io::copy(&mut file, sink)?;
        sink.flush()?;
        Ok(n_bytes)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
