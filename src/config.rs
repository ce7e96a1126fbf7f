// src/config.rs
use crate::error::AppResult;
use std::env;
use std::sync::OnceLock;

/// Configuração lida do ambiente uma única vez no arranque.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    /// Modo debug: páginas de erro passam a incluir o detalhe da exceção.
    pub debug: bool,
    pub porta: u16,
    /// Diretório com as fontes TTF usadas na geração de PDF.
    pub dir_fontes: String,
}

// O renderizador de erros não tem acesso ao AppState, então o modo debug
// também fica disponível num OnceLock global, definido uma vez em carregar().
static MODO_DEBUG: OnceLock<bool> = OnceLock::new();

impl Config {
    /// Lê a configuração do ambiente (.env já deve ter sido carregado).
    pub fn carregar() -> AppResult<Config> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://sgsv.db".to_string());

        // Sem segredo de sessão não arrancamos (mesma exigência do resto do stack).
        let session_secret = env::var("SESSION_SECRET")?;
        if session_secret.len() < 64 {
            tracing::warn!("⚠️ SESSION_SECRET é curta, considere usar uma chave mais longa!");
        }

        let debug = env::var("APP_DEBUG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let porta = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let dir_fontes = env::var("FONT_DIR").unwrap_or_else(|_| "./fonts".to_string());

        let _ = MODO_DEBUG.set(debug);
        if debug {
            tracing::warn!("🐛 APP_DEBUG ativo: páginas de erro mostrarão detalhes internos.");
        }

        Ok(Config {
            database_url,
            session_secret,
            debug,
            porta,
            dir_fontes,
        })
    }
}

/// Consulta global do modo debug (false até a configuração ser carregada).
pub fn modo_debug() -> bool {
    MODO_DEBUG.get().copied().unwrap_or(false)
}
