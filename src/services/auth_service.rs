// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::Usuario,
    services::usuario_service,
};
use sqlx::SqlitePool;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(senha: &str, hash_guardado: &str) -> AppResult<bool> {
    let senha = senha.to_string();
    let hash_guardado = hash_guardado.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&senha, &hash_guardado)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::Interno
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHash
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(senha: &str) -> AppResult<String> {
    let senha = senha.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt...");
        bcrypt::hash(&senha, bcrypt::DEFAULT_COST)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::Interno
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHash
    })
}

/// Autentica por login + senha. Mensagem genérica em qualquer falha: não
/// revelamos se o login existe.
pub async fn autenticar(pool: &SqlitePool, login: &str, senha: &str) -> AppResult<Usuario> {
    let usuario = match usuario_service::buscar_por_login(pool, login).await? {
        Some(u) => u,
        None => {
            tracing::warn!("Login falhou: usuário '{}' não encontrado", login);
            return Err(AppError::CredenciaisInvalidas);
        }
    };

    if verify_password(senha, &usuario.senha_hash).await? {
        tracing::info!("✅ Login bem-sucedido para: {}", usuario.login);
        Ok(usuario)
    } else {
        tracing::warn!("Login falhou: senha incorreta para '{}'", login);
        Err(AppError::CredenciaisInvalidas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn hash_e_verify_fazem_ida_e_volta() {
        let hash = hash_password("1234").await.unwrap();
        assert!(verify_password("1234", &hash).await.unwrap());
        assert!(!verify_password("4321", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn autenticar_nao_distingue_login_de_senha_errada() {
        let pool = db::pool_em_memoria().await;
        db::semear_usuarios(&pool).await.unwrap();

        let erro_login = autenticar(&pool, "nao_existe", "1234").await.unwrap_err();
        let erro_senha = autenticar(&pool, "lapa", "senha_errada").await.unwrap_err();
        assert!(matches!(erro_login, AppError::CredenciaisInvalidas));
        assert!(matches!(erro_senha, AppError::CredenciaisInvalidas));

        let lapa = autenticar(&pool, "lapa", "1234").await.unwrap();
        assert_eq!(lapa.tipo_usuario, "uvis");
    }
}
