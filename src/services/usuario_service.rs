// src/services/usuario_service.rs
use crate::{error::AppResult, models::usuario::Usuario};
use sqlx::SqlitePool;

const COLUNAS: &str = "id, nome_uvis, regiao, codigo_setor, login, senha_hash, tipo_usuario";

/// Busca um usuário pelo login (campo único).
pub async fn buscar_por_login(pool: &SqlitePool, login: &str) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuário por login: {}", login);
    let usuario = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {COLUNAS} FROM usuarios WHERE login = ?1"
    ))
    .bind(login)
    .fetch_optional(pool)
    .await?;
    Ok(usuario)
}

pub async fn buscar_por_id(pool: &SqlitePool, id: i64) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuário por ID: {}", id);
    let usuario = sqlx::query_as::<_, Usuario>(&format!(
        "SELECT {COLUNAS} FROM usuarios WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(usuario)
}

/// Unidades de campo (papel 'uvis'), para o filtro do relatório.
pub async fn listar_uvis(pool: &SqlitePool) -> AppResult<Vec<(i64, String)>> {
    let unidades = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, nome_uvis FROM usuarios WHERE tipo_usuario = 'uvis' ORDER BY nome_uvis ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(unidades)
}
