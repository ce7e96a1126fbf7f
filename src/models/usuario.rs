// src/models/usuario.rs
use serde::Deserialize;
use sqlx::FromRow;

/// Perfis de acesso do sistema.
/// uvis: unidade de campo, vê apenas os próprios pedidos.
/// admin: acesso total. operario: edita, sem relatórios.
/// visualizar: painel de gestão somente leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Papel {
    Uvis,
    Admin,
    Operario,
    Visualizar,
}

impl Papel {
    pub fn parse(valor: &str) -> Option<Papel> {
        match valor {
            "uvis" => Some(Papel::Uvis),
            "admin" => Some(Papel::Admin),
            "operario" => Some(Papel::Operario),
            "visualizar" => Some(Papel::Visualizar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Papel::Uvis => "uvis",
            Papel::Admin => "admin",
            Papel::Operario => "operario",
            Papel::Visualizar => "visualizar",
        }
    }

    /// Papéis com acesso ao painel /admin.
    pub fn e_gestao(&self) -> bool {
        matches!(self, Papel::Admin | Papel::Operario | Papel::Visualizar)
    }

    /// Papéis que podem alterar solicitações (status, geo, protocolo).
    pub fn pode_editar(&self) -> bool {
        matches!(self, Papel::Admin | Papel::Operario)
    }
}

// Representa um usuário lido da tabela 'usuarios'
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub nome_uvis: String,
    pub regiao: String,
    pub codigo_setor: String,
    pub login: String,
    pub senha_hash: String,
    pub tipo_usuario: String,
}

/// Principal tipado construído uma vez por requisição pelo middleware de
/// autenticação e passado aos handlers via extensões.
#[derive(Debug, Clone)]
pub struct UsuarioSessao {
    pub id: i64,
    pub nome: String,
    pub papel: Papel,
}

impl UsuarioSessao {
    pub fn de(usuario: &Usuario) -> Option<UsuarioSessao> {
        Some(UsuarioSessao {
            id: usuario.id,
            nome: usuario.nome_uvis.clone(),
            papel: Papel::parse(&usuario.tipo_usuario)?,
        })
    }
}

// Struct para dados do formulário de login
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub senha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn papel_parse_cobre_o_conjunto_fechado() {
        assert_eq!(Papel::parse("uvis"), Some(Papel::Uvis));
        assert_eq!(Papel::parse("admin"), Some(Papel::Admin));
        assert_eq!(Papel::parse("operario"), Some(Papel::Operario));
        assert_eq!(Papel::parse("visualizar"), Some(Papel::Visualizar));
        assert_eq!(Papel::parse("root"), None);
    }

    #[test]
    fn permissoes_por_papel() {
        assert!(!Papel::Uvis.e_gestao());
        assert!(Papel::Visualizar.e_gestao());
        assert!(!Papel::Visualizar.pode_editar());
        assert!(Papel::Operario.pode_editar());
        assert!(Papel::Admin.pode_editar());
    }
}
