// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::usuario::UsuarioSessao,
    services::usuario_service,
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const CHAVE_SESSAO: &str = "usuario_id";

/// Middleware de autenticação: exige sessão com usuário válido e monta o
/// principal tipado (id, nome, papel) nas extensões da requisição, uma vez
/// por requisição. Sem sessão -> /login.
pub async fn exigir_login(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let usuario_id = match session.get::<i64>(CHAVE_SESSAO).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            tracing::debug!("Autenticação MW: sem sessão, redirecionando para /login");
            return Ok(Redirect::to("/login").into_response());
        }
        Err(e) => {
            tracing::error!("Autenticação MW: erro ao ler sessão: {:?}", e);
            return Err(AppError::Sessao(format!("Erro ao verificar sessão: {}", e)));
        }
    };

    let usuario = match usuario_service::buscar_por_id(&state.db_pool, usuario_id).await? {
        Some(u) => u,
        None => {
            // Sessão órfã (usuário removido/inválido): limpa e volta ao login
            tracing::warn!("Autenticação MW: sessão com usuário {} inexistente", usuario_id);
            session
                .delete()
                .await
                .map_err(|e| AppError::Sessao(format!("Falha ao apagar sessão: {}", e)))?;
            return Ok(Redirect::to("/login").into_response());
        }
    };

    let sessao = match UsuarioSessao::de(&usuario) {
        Some(s) => s,
        None => {
            tracing::error!(
                "Autenticação MW: usuário {} com tipo desconhecido '{}'",
                usuario.id,
                usuario.tipo_usuario
            );
            return Err(AppError::Sessao("Perfil de usuário inválido.".to_string()));
        }
    };

    tracing::debug!(
        "Autenticação MW: '{}' ({}) autenticado",
        sessao.nome,
        sessao.papel.as_str()
    );
    request.extensions_mut().insert(sessao);
    Ok(next.run(request).await)
}
