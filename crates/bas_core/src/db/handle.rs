//! Connection handle owned or borrowed by one service instance.

use rusqlite::Connection;
use std::ops::Deref;

/// Database handle used for every operation of one service instance.
///
/// `Owned` handles are opened from configuration and closed on drop.
/// `Borrowed` handles point at a connection whose lifetime the caller manages,
/// which is how several services share one connection and one transaction.
#[derive(Debug)]
pub enum DbHandle<'conn> {
    Owned(Connection),
    Borrowed(&'conn Connection),
}

impl DbHandle<'_> {
    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        match self {
            Self::Owned(conn) => conn,
            Self::Borrowed(conn) => conn,
        }
    }

    #[cfg(test)]
    pub(crate) fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl Deref for DbHandle<'_> {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection()
    }
}

impl From<Connection> for DbHandle<'static> {
    fn from(value: Connection) -> Self {
        Self::Owned(value)
    }
}

impl<'conn> From<&'conn Connection> for DbHandle<'conn> {
    fn from(value: &'conn Connection) -> Self {
        Self::Borrowed(value)
    }
}
