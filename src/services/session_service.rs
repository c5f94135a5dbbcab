use crate::error::AppError;
use rusqlite::Connection;
use story_auth::Session;

/// Loads the remembered login, if any
pub fn load_session(conn: &Connection) -> Result<Option<Session>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT email, access_token, token_type, issued_at
         FROM session
         WHERE id = 1",
    )?;

    let result = stmt.query_row([], |row| {
        Ok(Session {
            email: row.get(0)?,
            access_token: row.get(1)?,
            token_type: row.get(2)?,
            issued_at: row.get(3)?,
        })
    });

    match result {
        Ok(session) => Ok(Some(session)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(AppError::Database(e)),
    }
}

/// Remembers a login, replacing the previous one
pub fn save_session(conn: &Connection, session: &Session) -> Result<(), AppError> {
    if session.access_token.trim().is_empty() {
        return Err(AppError::Validation("Session has no token".to_string()));
    }

    conn.execute(
        "INSERT INTO session (id, email, access_token, token_type, issued_at)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            access_token = excluded.access_token,
            token_type = excluded.token_type,
            issued_at = excluded.issued_at",
        (
            &session.email,
            &session.access_token,
            &session.token_type,
            session.issued_at,
        ),
    )?;

    log::debug!("Session saved for {}", session.email);
    Ok(())
}

/// Forgets the login
pub fn clear_session(conn: &Connection) -> Result<(), AppError> {
    conn.execute("DELETE FROM session", [])?;
    Ok(())
}
