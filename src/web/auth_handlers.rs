// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::{LoginForm, Papel},
    services::auth_service,
    state::AppState,
    templates::PaginaLogin,
    web::mw_auth::CHAVE_SESSAO,
};
use askama::Template;
use axum::{
    extract::{Form, State},
    response::{Html, IntoResponse, Redirect},
};
use tower_sessions::Session;

fn destino_do_papel(papel: Papel) -> &'static str {
    if papel.e_gestao() {
        "/admin"
    } else {
        "/"
    }
}

// GET /login
pub async fn exibir_login(session: Session) -> AppResult<impl IntoResponse> {
    // Já logado? O dashboard redireciona a gestão para /admin.
    if session
        .get::<i64>(CHAVE_SESSAO)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        tracing::debug!("GET /login: sessão ativa, redirecionando");
        return Ok(Redirect::to("/").into_response());
    }

    let template = PaginaLogin { erro: None };
    Ok(Html(template.render()?).into_response())
}

// POST /login
pub async fn processar_login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    tracing::info!("Tentativa de login para: {}", form.login);

    match auth_service::autenticar(&state.db_pool, &form.login, &form.senha).await {
        Ok(usuario) => {
            let papel = Papel::parse(&usuario.tipo_usuario).ok_or_else(|| {
                AppError::Sessao(format!(
                    "Usuário '{}' com tipo desconhecido",
                    usuario.login
                ))
            })?;

            // Novo ID de sessão no login (fixation)
            session
                .cycle_id()
                .await
                .map_err(|e| AppError::Sessao(format!("Falha ao rodar ID: {}", e)))?;
            session
                .insert(CHAVE_SESSAO, usuario.id)
                .await
                .map_err(|e| AppError::Sessao(format!("Falha ao inserir na sessão: {}", e)))?;

            Ok(Redirect::to(destino_do_papel(papel)).into_response())
        }
        Err(AppError::CredenciaisInvalidas) => {
            // Mensagem genérica: não revela qual campo falhou
            let template = PaginaLogin {
                erro: Some("Login incorreto.".to_string()),
            };
            Ok(Html(template.render()?).into_response())
        }
        Err(e) => Err(e),
    }
}

// GET /logout
pub async fn processar_logout(session: Session) -> AppResult<Redirect> {
    let usuario_id: Option<i64> = session.get(CHAVE_SESSAO).await.ok().flatten();

    session
        .delete()
        .await
        .map_err(|e| AppError::Sessao(format!("Falha ao apagar sessão: {}", e)))?;

    if let Some(id) = usuario_id {
        tracing::info!("🚪 Usuário {} saiu.", id);
    } else {
        tracing::info!("🚪 Sessão anónima encerrada.");
    }

    Ok(Redirect::to("/login"))
}
