// src/error.rs
use crate::config;
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de variável de ambiente: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Erro ao renderizar template: {0}")]
    Template(#[from] askama::Error),

    #[error("Erro ao processar password")]
    PasswordHash,

    #[error("Credenciais inválidas")]
    CredenciaisInvalidas,

    #[error("Erro na sessão: {0}")]
    Sessao(String),

    /// Dados de formulário inválidos (ex.: data/hora mal formatada).
    /// Os handlers tratam localmente para reexibir o formulário; se chegar
    /// aqui, vira uma página de erro 422.
    #[error("{0}")]
    Validacao(String),

    #[error("Registo não encontrado")]
    NaoEncontrado,

    #[error("Não autorizado")]
    NaoAutorizado,

    #[error("Erro ao gerar ficheiro de exportação: {0}")]
    Exportacao(String),

    #[error("Erro interno inesperado")]
    Interno,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // Loga o erro detalhado no servidor
        tracing::error!("Erro processado: {:?}", self);

        let (status, titulo, mensagem) = match &self {
            AppError::Sqlx(_) | AppError::SqlxMigrate(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro ao aceder aos dados.".to_string(),
            ),
            AppError::EnvVar(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro de configuração.".to_string(),
            ),
            AppError::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro ao montar a página.".to_string(),
            ),
            AppError::PasswordHash => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro ao processar credenciais.".to_string(),
            ),
            AppError::CredenciaisInvalidas => (
                StatusCode::UNAUTHORIZED,
                "Acesso negado",
                "Login ou senha inválidos.".to_string(),
            ),
            AppError::Sessao(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro na gestão da sua sessão.".to_string(),
            ),
            AppError::Validacao(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Dados inválidos",
                msg.clone(),
            ),
            AppError::NaoEncontrado => (
                StatusCode::NOT_FOUND,
                "Página não encontrada",
                "O registo ou página que você tentou acessar não existe.".to_string(),
            ),
            AppError::NaoAutorizado => (
                StatusCode::FORBIDDEN,
                "Acesso negado",
                "Você não tem permissão para acessar esta área.".to_string(),
            ),
            AppError::Exportacao(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Erro ao gerar o ficheiro solicitado.".to_string(),
            ),
            AppError::Interno => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erro interno do servidor",
                "Ocorreu um erro inesperado. Por favor, tente novamente.".to_string(),
            ),
        };

        // Em produção o detalhe da exceção nunca chega ao navegador.
        let detalhe = if config::modo_debug() {
            format!("<pre>{}</pre>", self)
        } else {
            String::new()
        };

        (
            status,
            Html(format!(
                r#"<!DOCTYPE html><html lang="pt-BR"><head><meta charset="utf-8"><title>Erro {codigo}</title>
<style>body{{font-family:sans-serif;background:#f4f6f8;color:#333;text-align:center;padding-top:60px;}}</style></head>
<body><h1>Erro {codigo}</h1><h2>{titulo}</h2><p>{mensagem}</p>{detalhe}
<a href="javascript:history.back()">Voltar</a></body></html>"#,
                codigo = status.as_u16(),
                titulo = titulo,
                mensagem = mensagem,
                detalhe = detalhe,
            )),
        )
            .into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
