use crate::error::DecodeError;

/// Column flag bit 0: cell payloads are packed with the integer codec.
pub const FLAG_PACKED_INT: u8 = 0x01;

/// A declared column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnEntry {
    /// 1-based id of the owning table.
    pub table_id: u32,
    pub name: String,
    pub elem_bits: u32,
    pub flag_bits: u8,
}

impl ColumnEntry {
    pub fn is_packed_int(&self) -> bool {
        self.flag_bits & FLAG_PACKED_INT != 0
    }
}

/// Tables and columns declared so far in one stream.
///
/// Both lists only grow. Ids are 1-based and must arrive in order, so the
/// next valid id is always `len() + 1` and lookup is a plain index.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    tables: Vec<String>,
    columns: Vec<ColumnEntry>,
}

fn corrupt(reason: &'static str) -> DecodeError {
    DecodeError::Corrupt { reason }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Name of a declared table. `id` is 1-based.
    pub fn table(&self, id: u32) -> Option<&str> {
        let idx = id.checked_sub(1)?;
        self.tables.get(idx as usize).map(String::as_str)
    }

    /// A declared column. `id` is 1-based.
    pub fn column(&self, id: u32) -> Option<&ColumnEntry> {
        let idx = id.checked_sub(1)?;
        self.columns.get(idx as usize)
    }

    fn tables_len(&self) -> u64 {
        self.tables.len() as u64
    }

    fn columns_len(&self) -> u64 {
        self.columns.len() as u64
    }

    /// Validate a new-table declaration before its name is read.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] for id 0, a repeated id, a skipped id, or
    /// an empty name.
    pub fn check_new_table(&self, id: u32, name_len: u64) -> Result<(), DecodeError> {
        let id = u64::from(id);
        if id == 0 {
            return Err(corrupt("bad table id"));
        }
        if id <= self.tables_len() {
            return Err(corrupt("table id already specified"));
        }
        if id > self.tables_len() + 1 {
            return Err(corrupt("table id out of order"));
        }
        if name_len == 0 {
            return Err(corrupt("empty table name"));
        }
        Ok(())
    }

    /// Validate a new-column declaration before its name is read.
    ///
    /// Column id 0 gets its own message only when `null_id_distinct` is
    /// set; otherwise it is caught as already specified.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] describing the first rule broken.
    pub fn check_new_column(
        &self,
        id: u32,
        table_id: u32,
        name_len: u64,
        null_id_distinct: bool,
    ) -> Result<(), DecodeError> {
        let id = u64::from(id);
        if id == 0 && null_id_distinct {
            return Err(corrupt("bad column/stream id"));
        }
        if id <= self.columns_len() {
            return Err(corrupt("column id already specified"));
        }
        if id > self.columns_len() + 1 {
            return Err(corrupt("column id out of order"));
        }
        if table_id == 0 {
            return Err(corrupt("bad column table-id (null)"));
        }
        if u64::from(table_id) > self.tables_len() {
            return Err(corrupt("bad column table-id"));
        }
        if name_len == 0 {
            return Err(corrupt("empty column name"));
        }
        Ok(())
    }

    /// Look up the column a cell event refers to.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] if `id` is 0 or undeclared.
    pub fn check_cell(&self, id: u32) -> Result<&ColumnEntry, DecodeError> {
        if id == 0 {
            return Err(corrupt("bad cell event id (null)"));
        }
        self.column(id).ok_or_else(|| corrupt("bad cell event id"))
    }

    /// Validate the table id of a next-row event.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] if `id` is 0 or undeclared.
    pub fn check_next_row(&self, id: u32) -> Result<&str, DecodeError> {
        if id == 0 {
            return Err(corrupt("bad table id within next-row event (null)"));
        }
        self.table(id)
            .ok_or_else(|| corrupt("bad table id within next-row event"))
    }

    /// Validate the table id of a move-ahead event.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Corrupt`] if `id` is 0 or undeclared.
    pub fn check_move_ahead(&self, id: u32) -> Result<&str, DecodeError> {
        if id == 0 {
            return Err(corrupt("bad table id within move-ahead event (null)"));
        }
        self.table(id)
            .ok_or_else(|| corrupt("bad table id within move-ahead event"))
    }

    /// Record a table. The caller has already passed [`Registry::check_new_table`].
    pub fn add_table(&mut self, name: String) -> u32 {
        self.tables.push(name);
        #[allow(clippy::cast_possible_truncation)]
        let id = self.tables.len() as u32;
        id
    }

    /// Record a column. The caller has already passed [`Registry::check_new_column`].
    pub fn add_column(&mut self, entry: ColumnEntry) -> u32 {
        debug_assert!(self.table(entry.table_id).is_some());
        self.columns.push(entry);
        #[allow(clippy::cast_possible_truncation)]
        let id = self.columns.len() as u32;
        id
    }
}
