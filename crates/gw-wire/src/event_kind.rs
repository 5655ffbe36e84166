/// Event kind codes, as they appear in the first byte of every event.
///
/// Codes 12–17 are the wide ("2") variants. They carry 16-bit size fields
/// and exist only under packed framing.
///
/// ```text
/// ┌──────┬────────────────┬──────┬─────────────────┐
/// │ Code │ Kind           │ Code │ Kind            │
/// ├──────┼────────────────┼──────┼─────────────────┤
/// │ 0    │ (bad)          │ 9    │ cell-data       │
/// │ 1    │ error-message  │ 10   │ next-row        │
/// │ 2    │ end-stream     │ 11   │ move-ahead      │
/// │ 3    │ remote-path    │ 12   │ error-message-2 │
/// │ 4    │ use-schema     │ 13   │ remote-path-2   │
/// │ 5    │ new-table      │ 14   │ use-schema-2    │
/// │ 6    │ new-column     │ 15   │ new-table-2     │
/// │ 7    │ open-stream    │ 16   │ cell-default-2  │
/// │ 8    │ cell-default   │ 17   │ cell-data-2     │
/// └──────┴────────────────┴──────┴─────────────────┘
/// ```
pub mod code {
    pub const BAD: u8 = 0;
    pub const ERROR_MESSAGE: u8 = 1;
    pub const END_STREAM: u8 = 2;
    pub const REMOTE_PATH: u8 = 3;
    pub const USE_SCHEMA: u8 = 4;
    pub const NEW_TABLE: u8 = 5;
    pub const NEW_COLUMN: u8 = 6;
    pub const OPEN_STREAM: u8 = 7;
    pub const CELL_DEFAULT: u8 = 8;
    pub const CELL_DATA: u8 = 9;
    pub const NEXT_ROW: u8 = 10;
    pub const MOVE_AHEAD: u8 = 11;
    pub const ERROR_MESSAGE_2: u8 = 12;
    pub const REMOTE_PATH_2: u8 = 13;
    pub const USE_SCHEMA_2: u8 = 14;
    pub const NEW_TABLE_2: u8 = 15;
    pub const CELL_DEFAULT_2: u8 = 16;
    pub const CELL_DATA_2: u8 = 17;
}

/// A recognized event kind.
///
/// Code 0 is deliberately absent: a zero kind byte is what a block of
/// zeroed memory looks like, and the decoder reports it separately.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    ErrorMessage,
    EndStream,
    RemotePath,
    UseSchema,
    NewTable,
    NewColumn,
    OpenStream,
    CellDefault,
    CellData,
    NextRow,
    MoveAhead,
    ErrorMessage2,
    RemotePath2,
    UseSchema2,
    NewTable2,
    CellDefault2,
    CellData2,
}

impl EventKind {
    /// Parse a kind byte. Returns `None` for 0 and for anything above 17.
    pub fn from_code(value: u8) -> Option<Self> {
        let kind = match value {
            code::ERROR_MESSAGE => Self::ErrorMessage,
            code::END_STREAM => Self::EndStream,
            code::REMOTE_PATH => Self::RemotePath,
            code::USE_SCHEMA => Self::UseSchema,
            code::NEW_TABLE => Self::NewTable,
            code::NEW_COLUMN => Self::NewColumn,
            code::OPEN_STREAM => Self::OpenStream,
            code::CELL_DEFAULT => Self::CellDefault,
            code::CELL_DATA => Self::CellData,
            code::NEXT_ROW => Self::NextRow,
            code::MOVE_AHEAD => Self::MoveAhead,
            code::ERROR_MESSAGE_2 => Self::ErrorMessage2,
            code::REMOTE_PATH_2 => Self::RemotePath2,
            code::USE_SCHEMA_2 => Self::UseSchema2,
            code::NEW_TABLE_2 => Self::NewTable2,
            code::CELL_DEFAULT_2 => Self::CellDefault2,
            code::CELL_DATA_2 => Self::CellData2,
            _ => return None,
        };
        Some(kind)
    }

    pub fn code(self) -> u8 {
        match self {
            Self::ErrorMessage => code::ERROR_MESSAGE,
            Self::EndStream => code::END_STREAM,
            Self::RemotePath => code::REMOTE_PATH,
            Self::UseSchema => code::USE_SCHEMA,
            Self::NewTable => code::NEW_TABLE,
            Self::NewColumn => code::NEW_COLUMN,
            Self::OpenStream => code::OPEN_STREAM,
            Self::CellDefault => code::CELL_DEFAULT,
            Self::CellData => code::CELL_DATA,
            Self::NextRow => code::NEXT_ROW,
            Self::MoveAhead => code::MOVE_AHEAD,
            Self::ErrorMessage2 => code::ERROR_MESSAGE_2,
            Self::RemotePath2 => code::REMOTE_PATH_2,
            Self::UseSchema2 => code::USE_SCHEMA_2,
            Self::NewTable2 => code::NEW_TABLE_2,
            Self::CellDefault2 => code::CELL_DEFAULT_2,
            Self::CellData2 => code::CELL_DATA_2,
        }
    }

    /// True for the 16-bit-size variants (codes 12–17).
    pub fn is_wide(self) -> bool {
        self.code() >= code::ERROR_MESSAGE_2
    }

    /// The logical kind with any wide marker stripped.
    ///
    /// `NewTable2.narrow()` is `NewTable`; narrow kinds map to themselves.
    #[must_use]
    pub fn narrow(self) -> Self {
        match self {
            Self::ErrorMessage2 => Self::ErrorMessage,
            Self::RemotePath2 => Self::RemotePath,
            Self::UseSchema2 => Self::UseSchema,
            Self::NewTable2 => Self::NewTable,
            Self::CellDefault2 => Self::CellDefault,
            Self::CellData2 => Self::CellData,
            other => other,
        }
    }

    /// The wide variant of a kind, if it has one.
    pub fn wide(self) -> Option<Self> {
        match self.narrow() {
            Self::ErrorMessage => Some(Self::ErrorMessage2),
            Self::RemotePath => Some(Self::RemotePath2),
            Self::UseSchema => Some(Self::UseSchema2),
            Self::NewTable => Some(Self::NewTable2),
            Self::CellDefault => Some(Self::CellDefault2),
            Self::CellData => Some(Self::CellData2),
            _ => None,
        }
    }

    /// Report name of the logical kind. Wide variants share their narrow
    /// kind's name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ErrorMessage | Self::ErrorMessage2 => "error-message",
            Self::EndStream => "end-stream",
            Self::RemotePath | Self::RemotePath2 => "remote-path",
            Self::UseSchema | Self::UseSchema2 => "use-schema",
            Self::NewTable | Self::NewTable2 => "new-table",
            Self::NewColumn => "new-column",
            Self::OpenStream => "open-stream",
            Self::CellDefault | Self::CellDefault2 => "cell-default",
            Self::CellData | Self::CellData2 => "cell-data",
            Self::NextRow => "next-row",
            Self::MoveAhead => "move-ahead",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())?;
        if self.is_wide() {
            f.write_str("-2")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_roundtrips() {
        for value in 1..=17u8 {
            let kind = EventKind::from_code(value).expect("known code");
            assert_eq!(kind.code(), value, "code mismatch for {kind:?}");
        }
    }

    #[test]
    fn zero_and_out_of_range_are_unknown() {
        assert_eq!(EventKind::from_code(code::BAD), None);
        assert_eq!(EventKind::from_code(18), None);
        assert_eq!(EventKind::from_code(0xFF), None);
    }

    #[test]
    fn wide_kinds_narrow_to_their_base() {
        let pairs = [
            (EventKind::ErrorMessage2, EventKind::ErrorMessage),
            (EventKind::RemotePath2, EventKind::RemotePath),
            (EventKind::UseSchema2, EventKind::UseSchema),
            (EventKind::NewTable2, EventKind::NewTable),
            (EventKind::CellDefault2, EventKind::CellDefault),
            (EventKind::CellData2, EventKind::CellData),
        ];
        for (wide, narrow) in pairs {
            assert!(wide.is_wide());
            assert!(!narrow.is_wide());
            assert_eq!(wide.narrow(), narrow);
            assert_eq!(narrow.wide(), Some(wide));
            assert_eq!(wide.name(), narrow.name());
        }
    }

    #[test]
    fn kinds_without_wide_form() {
        for kind in [
            EventKind::EndStream,
            EventKind::NewColumn,
            EventKind::OpenStream,
            EventKind::NextRow,
            EventKind::MoveAhead,
        ] {
            assert_eq!(kind.wide(), None, "{kind:?}");
            assert_eq!(kind.narrow(), kind);
        }
    }

    #[test]
    fn display_marks_wide_variants() {
        assert_eq!(EventKind::NewTable.to_string(), "new-table");
        assert_eq!(EventKind::NewTable2.to_string(), "new-table-2");
        assert_eq!(EventKind::MoveAhead.to_string(), "move-ahead");
    }
}
