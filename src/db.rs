// src/db.rs
use crate::error::AppResult;
use crate::services::auth_service;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn criar_pool(database_url: &str) -> AppResult<SqlitePool> {
    tracing::info!("Ligando à base de dados: {}", database_url);

    // Opções de conexão (criar se não existir, timeout)
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    tracing::info!("Executando migrações da base de dados...");
    MIGRATOR.run(&pool).await?;
    tracing::info!("Migrações concluídas.");

    Ok(pool)
}

/// Usuários fixos garantidos no arranque: perfis de gestão e duas UVIS de
/// homologação. Idempotente: cria quem falta e corrige tipo_usuario que
/// tenha divergido.
const USUARIOS_SEMENTE: &[(&str, &str, &str, &str, &str, &str)] = &[
    // (login, senha, nome_uvis, regiao, codigo_setor, tipo_usuario)
    ("admin", "admin123", "Administrador Original", "CENTRAL", "00", "admin"),
    ("operario", "operario123", "Usuário Operário", "OPERACIONAL", "98", "operario"),
    ("visualizar", "1234", "Usuário Somente Leitura", "AUDITORIA", "99", "visualizar"),
    ("lapa", "1234", "UVIS Lapa/Pinheiros", "OESTE", "90", "uvis"),
    ("teste", "1234", "UVIS Teste QA", "SUL", "10", "uvis"),
];

pub async fn semear_usuarios(pool: &SqlitePool) -> AppResult<()> {
    tracing::info!(">>> Iniciando verificação do banco de dados...");

    for (login, senha, nome_uvis, regiao, codigo_setor, tipo) in USUARIOS_SEMENTE {
        let existente: Option<(i64, String)> =
            sqlx::query_as("SELECT id, tipo_usuario FROM usuarios WHERE login = ?1")
                .bind(login)
                .fetch_optional(pool)
                .await?;

        match existente {
            Some((id, tipo_atual)) => {
                if tipo_atual != *tipo {
                    tracing::warn!(
                        "Corrigindo tipo do usuário '{}' ({} -> {})",
                        login,
                        tipo_atual,
                        tipo
                    );
                    sqlx::query("UPDATE usuarios SET tipo_usuario = ?1 WHERE id = ?2")
                        .bind(tipo)
                        .bind(id)
                        .execute(pool)
                        .await?;
                }
                tracing::debug!("Usuário '{}' encontrado (ID: {})", login, id);
            }
            None => {
                tracing::info!("--- Criando usuário '{}' ({})... ---", login, tipo);
                let senha_hash = auth_service::hash_password(senha).await?;
                sqlx::query(
                    r#"
                    INSERT INTO usuarios (nome_uvis, regiao, codigo_setor, login, senha_hash, tipo_usuario)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(nome_uvis)
                .bind(regiao)
                .bind(codigo_setor)
                .bind(login)
                .bind(senha_hash)
                .bind(tipo)
                .execute(pool)
                .await?;
            }
        }
    }

    tracing::info!(">>> Banco de dados verificado com sucesso!");
    Ok(())
}

#[cfg(test)]
pub async fn pool_em_memoria() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("opções sqlite")
        .create_if_missing(true);

    // Uma única conexão: cada conexão :memory: teria a sua própria base.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("pool em memória");

    MIGRATOR.run(&pool).await.expect("migrações de teste");
    pool
}
