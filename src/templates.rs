// src/templates.rs
use crate::models::solicitacao::{NovaSolicitacaoForm, Solicitacao, SolicitacaoComAutor};
use crate::services::relatorio_service::AgregadoMensal;
use askama::Template;

// Struct para o template `login.html` (ficheiro externo em templates/)
#[derive(Template)]
#[template(path = "login.html")]
pub struct PaginaLogin {
    pub erro: Option<String>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct PaginaDashboard {
    pub nome: String,
    pub solicitacoes: Vec<Solicitacao>,
    pub pagina: i64,
    pub total_paginas: i64,
    pub filtro_status: String,
    pub status_opcoes: Vec<&'static str>,
    pub mensagem: Option<String>,
    pub erro: Option<String>,
}

#[derive(Template)]
#[template(path = "cadastro.html")]
pub struct PaginaCadastro {
    pub erro: Option<String>,
    // Valores reapresentados quando a validação falha
    pub valores: NovaSolicitacaoForm,
}

#[derive(Template)]
#[template(path = "admin.html")]
pub struct PaginaAdmin {
    pub pedidos: Vec<SolicitacaoComAutor>,
    pub pagina: i64,
    pub total_paginas: i64,
    pub total_itens: i64,
    pub filtro_status: String,
    pub filtro_unidade: String,
    pub filtro_regiao: String,
    pub status_opcoes: Vec<&'static str>,
    pub mensagem: Option<String>,
    pub erro: Option<String>,
    // Permissões do papel logado, para esconder botões na tela
    pub pode_editar: bool,
    pub e_admin: bool,
}

#[derive(Template)]
#[template(path = "editar_completo.html")]
pub struct PaginaEdicaoCompleta {
    pub s: Solicitacao,
    pub nome_uvis: String,
    pub status_opcoes: Vec<&'static str>,
    pub erro: Option<String>,
}

#[derive(Template)]
#[template(path = "relatorios.html")]
pub struct PaginaRelatorios {
    pub agregado: AgregadoMensal,
    pub anos: Vec<String>,
    pub unidades: Vec<(i64, String)>,
    // Séries pré-serializadas para os gráficos do lado do cliente
    pub serie_json: String,
    pub status_json: String,
}

#[derive(Template)]
#[template(path = "agenda.html")]
pub struct PaginaAgenda {
    pub nome: String,
    pub eventos_json: String,
}

impl PaginaDashboard {
    pub fn status_selecionado(&self, opcao: &str) -> bool {
        self.filtro_status == opcao
    }
}

impl PaginaAdmin {
    pub fn status_selecionado(&self, opcao: &str) -> bool {
        self.filtro_status == opcao
    }
}

impl PaginaEdicaoCompleta {
    pub fn status_selecionado(&self, opcao: &str) -> bool {
        self.s.status == opcao
    }
}

impl PaginaRelatorios {
    pub fn ano_selecionado(&self, ano: &str) -> bool {
        self.agregado.ano.to_string() == ano
    }

    pub fn mes_selecionado(&self, mes: u32) -> bool {
        self.agregado.mes == mes
    }

    pub fn uvis_selecionada(&self, id: &i64) -> bool {
        self.agregado.uvis_id == Some(*id)
    }

    pub fn meses(&self) -> Vec<u32> {
        (1..=12).collect()
    }
}
