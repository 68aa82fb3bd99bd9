use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "escuelas.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// Creates every table and index the store relies on. Safe to run against an
/// existing workspace.
pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS escuelas(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            nombre TEXT NOT NULL,
            nombre_corto TEXT NOT NULL,
            direccion TEXT NOT NULL,
            telefono TEXT,
            email TEXT,
            director TEXT,
            logo_url TEXT,
            descripcion TEXT,
            activa INTEGER NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_escuelas_nombre ON escuelas(nombre)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS ciclos_escolares(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            escuela_id TEXT NOT NULL,
            nombre TEXT NOT NULL,
            fecha_inicio INTEGER NOT NULL,
            fecha_fin INTEGER NOT NULL,
            activo INTEGER NOT NULL,
            FOREIGN KEY(escuela_id) REFERENCES escuelas(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_ciclos_escuela ON ciclos_escolares(escuela_id, activo)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS calendario(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            escuela_id TEXT NOT NULL,
            ciclo_escolar_id TEXT NOT NULL,
            fecha INTEGER NOT NULL,
            tipo TEXT NOT NULL,
            descripcion TEXT,
            activo INTEGER NOT NULL,
            FOREIGN KEY(escuela_id) REFERENCES escuelas(id),
            FOREIGN KEY(ciclo_escolar_id) REFERENCES ciclos_escolares(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calendario_escuela ON calendario(escuela_id, activo)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calendario_ciclo ON calendario(ciclo_escolar_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_calendario_fecha ON calendario(fecha)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grupos(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            escuela_id TEXT NOT NULL,
            nombre TEXT NOT NULL,
            grado TEXT NOT NULL,
            activo INTEGER NOT NULL,
            FOREIGN KEY(escuela_id) REFERENCES escuelas(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grupos_escuela ON grupos(escuela_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS materias(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            escuela_id TEXT NOT NULL,
            nombre TEXT NOT NULL,
            descripcion TEXT,
            creditos REAL,
            activa INTEGER NOT NULL,
            FOREIGN KEY(escuela_id) REFERENCES escuelas(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_materias_escuela ON materias(escuela_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS eventos_escolares(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            escuela_id TEXT NOT NULL,
            nombre TEXT NOT NULL,
            descripcion TEXT,
            tipo TEXT NOT NULL,
            activo INTEGER NOT NULL,
            FOREIGN KEY(escuela_id) REFERENCES escuelas(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_eventos_escolares_escuela ON eventos_escolares(escuela_id)",
        [],
    )?;

    // Leads have no owning school until they are transferred.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS prospectos(
            id TEXT PRIMARY KEY,
            creation_time INTEGER NOT NULL,
            nombre TEXT NOT NULL,
            nombre_corto TEXT NOT NULL,
            email TEXT NOT NULL,
            direccion TEXT,
            telefono TEXT,
            director TEXT,
            logo_url TEXT,
            descripcion TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_prospectos_email ON prospectos(email)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("first init");
        init_schema(&conn).expect("second init");

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table'
                   AND name IN ('escuelas', 'ciclos_escolares', 'calendario', 'grupos',
                                'materias', 'eventos_escolares', 'prospectos')",
                [],
                |r| r.get(0),
            )
            .expect("count tables");
        assert_eq!(tables, 7);
    }

    #[test]
    fn open_db_creates_workspace_file() {
        let dir = std::env::temp_dir().join(format!("escuelasd-db-{}", uuid::Uuid::new_v4()));
        let _conn = open_db(&dir).expect("open workspace");
        assert!(dir.join(DB_FILE).is_file());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
