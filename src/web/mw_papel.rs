// src/web/mw_papel.rs
use crate::{error::AppError, models::usuario::{Papel, UsuarioSessao}};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

fn recusar(sessao: &UsuarioSessao, rota: &str, destino: &str) -> Response {
    tracing::warn!(
        "Papel MW: acesso negado a {} para '{}' ({})",
        rota,
        sessao.nome,
        sessao.papel.as_str()
    );
    let aviso = urlencoding::encode("Você não tem permissão para essa ação.");
    Redirect::to(&format!("{destino}?erro={aviso}")).into_response()
}

/// Painel de gestão: admin, operario e visualizar. UVIS volta ao seu painel.
/// Deve correr *depois* de `exigir_login`.
pub async fn exigir_gestao(
    Extension(sessao): Extension<UsuarioSessao>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if sessao.papel.e_gestao() {
        Ok(next.run(request).await)
    } else {
        Ok(recusar(&sessao, "área de gestão", "/"))
    }
}

/// Mutações e exportações da listagem: admin e operario.
/// O perfil visualizar pode ver, mas nunca alterar.
pub async fn exigir_editor(
    Extension(sessao): Extension<UsuarioSessao>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if sessao.papel.pode_editar() {
        Ok(next.run(request).await)
    } else if sessao.papel.e_gestao() {
        Ok(recusar(&sessao, "edição", "/admin"))
    } else {
        Ok(recusar(&sessao, "edição", "/"))
    }
}

/// Edição completa, remoção e superfície de relatórios: somente admin.
pub async fn exigir_admin(
    Extension(sessao): Extension<UsuarioSessao>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if sessao.papel == Papel::Admin {
        Ok(next.run(request).await)
    } else if sessao.papel.e_gestao() {
        Ok(recusar(&sessao, "área exclusiva do admin", "/admin"))
    } else {
        Ok(recusar(&sessao, "área exclusiva do admin", "/"))
    }
}
