// src/services/pdf_service.rs
use crate::{
    error::{AppError, AppResult},
    models::solicitacao::{SolicitacaoComAutor, Status},
    services::relatorio_service::{AgregadoMensal, ContagemGrupo},
};
use genpdf::elements::{Break, LinearLayout, PageBreak, Paragraph, TableLayout};
use genpdf::elements::FrameCellDecorator;
use genpdf::fonts;
use genpdf::style::Style;
use genpdf::{Alignment, Document, Element, SimplePageDecorator};

// Registos por tabela de detalhe, para limitar o tamanho de cada página.
const LINHAS_POR_BLOCO: usize = 20;

const SECOES: &[&str] = &[
    "Por região",
    "Por status",
    "Por foco",
    "Por tipo de visita",
    "Por altura de voo",
    "Por unidade (UVIS)",
    "Detalhamento das solicitações",
];

fn erro_pdf(e: impl std::fmt::Display) -> AppError {
    AppError::Exportacao(format!("pdf: {e}"))
}

fn estilos() -> (Style, Style, Style) {
    let normal = Style::new().with_font_size(8);
    let cabecalho = Style::new().bold().with_font_size(8);
    let titulo_secao = Style::new().bold().with_font_size(11);
    (normal, cabecalho, titulo_secao)
}

fn tabela_de_grupos(titulo: &str, grupos: &[ContagemGrupo]) -> AppResult<LinearLayout> {
    let (normal, cabecalho, titulo_secao) = estilos();
    let mut bloco = LinearLayout::vertical();
    bloco.push(Paragraph::new(titulo).styled(titulo_secao));
    bloco.push(Break::new(0.5));

    if grupos.is_empty() {
        bloco.push(Paragraph::new("Sem registos no período.").styled(normal));
        bloco.push(Break::new(1.0));
        return Ok(bloco);
    }

    let mut tabela = TableLayout::new(vec![3, 1]);
    tabela.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut linha = tabela.row();
    linha.push_element(Paragraph::new(titulo).styled(cabecalho.clone()));
    linha.push_element(Paragraph::new("Total").styled(cabecalho.clone()));
    linha.push().map_err(erro_pdf)?;

    for grupo in grupos {
        let mut linha = tabela.row();
        linha.push_element(Paragraph::new(grupo.chave.as_str()).styled(normal.clone()));
        linha.push_element(Paragraph::new(grupo.total.to_string()).styled(normal.clone()));
        linha.push().map_err(erro_pdf)?;
    }

    bloco.push(tabela);
    bloco.push(Break::new(1.0));
    Ok(bloco)
}

fn tabela_de_detalhes(bloco_linhas: &[SolicitacaoComAutor]) -> AppResult<TableLayout> {
    let (normal, cabecalho, _) = estilos();
    let mut tabela = TableLayout::new(vec![1, 3, 2, 2, 2, 2]);
    tabela.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut linha = tabela.row();
    for titulo in ["ID", "Unidade", "Data", "Foco", "Status", "Protocolo"] {
        linha.push_element(Paragraph::new(titulo).styled(cabecalho.clone()));
    }
    linha.push().map_err(erro_pdf)?;

    for item in bloco_linhas {
        let s = &item.solicitacao;
        let mut linha = tabela.row();
        linha.push_element(Paragraph::new(s.id.to_string()).styled(normal.clone()));
        linha.push_element(Paragraph::new(item.nome_uvis.as_str()).styled(normal.clone()));
        linha.push_element(
            Paragraph::new(format!("{} {}", s.data_agendamento, s.hora_agendamento))
                .styled(normal.clone()),
        );
        linha.push_element(Paragraph::new(s.foco.as_str()).styled(normal.clone()));
        linha.push_element(Paragraph::new(s.status.as_str()).styled(normal.clone()));
        linha.push_element(Paragraph::new(s.protocolo_texto()).styled(normal.clone()));
        linha.push().map_err(erro_pdf)?;
    }

    Ok(tabela)
}

/// Gera o relatório mensal em PDF: capa com o resumo, sumário, uma tabela
/// por dimensão de agregação e o detalhamento dos registos em blocos.
/// As fontes TTF são carregadas de `dir_fontes` (família LiberationSans).
pub fn gerar_relatorio(
    agregado: &AgregadoMensal,
    detalhes: &[SolicitacaoComAutor],
    dir_fontes: &str,
) -> AppResult<Vec<u8>> {
    let familia = fonts::from_files(dir_fontes, "LiberationSans", None).map_err(|e| {
        erro_pdf(format!(
            "fontes não encontradas em '{}': {}",
            dir_fontes, e
        ))
    })?;

    let mut doc = Document::new(familia);
    doc.set_title("Relatório de Solicitações de Voo");

    let mut decorador = SimplePageDecorator::new();
    decorador.set_margins(10);
    // Número de página corrido na margem superior direita de cada página
    // (genpdf só decora o topo; ver DESIGN.md).
    decorador.set_header(|pagina| {
        Paragraph::new(format!("SGSV — Página {}", pagina))
            .aligned(Alignment::Right)
            .styled(Style::new().with_font_size(7))
    });
    doc.set_page_decorator(decorador);

    let (normal, _, titulo_secao) = estilos();

    // --- Capa / resumo ---
    doc.push(
        Paragraph::new("Relatório de Solicitações de Voo de Drone")
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(16)),
    );
    doc.push(
        Paragraph::new(format!("Período: {:02}/{}", agregado.mes, agregado.ano))
            .aligned(Alignment::Center)
            .styled(Style::new().with_font_size(11)),
    );
    if let Some(uvis) = agregado.uvis_id {
        doc.push(
            Paragraph::new(format!("Filtrado pela unidade nº {}", uvis))
                .aligned(Alignment::Center)
                .styled(normal.clone()),
        );
    }
    doc.push(Break::new(2.0));

    let resumo = [
        ("Total de solicitações", agregado.total),
        ("Aprovadas", agregado.contagem_status(Status::Aprovado)),
        ("Negadas", agregado.contagem_status(Status::Negado)),
        ("Em análise", agregado.contagem_status(Status::EmAnalise)),
        ("Pendentes", agregado.contagem_status(Status::Pendente)),
    ];
    for (rotulo, valor) in resumo {
        doc.push(Paragraph::new(format!("{}: {}", rotulo, valor)).styled(normal.clone()));
    }
    doc.push(Break::new(2.0));

    // --- Sumário ---
    doc.push(Paragraph::new("Sumário").styled(titulo_secao.clone()));
    doc.push(Break::new(0.5));
    for (indice, secao) in SECOES.iter().enumerate() {
        doc.push(Paragraph::new(format!("{}. {}", indice + 1, secao)).styled(normal.clone()));
    }

    // Gráficos (pizza de status, barras de unidades, linha mensal) ficam de
    // fora: sem biblioteca de gráficos disponível, vai uma nota no lugar.
    doc.push(Break::new(1.0));
    doc.push(
        Paragraph::new(
            "Nota: os gráficos do relatório estão disponíveis apenas na versão em tela.",
        )
        .styled(Style::new().italic().with_font_size(8)),
    );
    doc.push(PageBreak::new());

    // --- Uma tabela por dimensão ---
    let blocos: [(&str, &[ContagemGrupo]); 6] = [
        ("Por região", &agregado.por_regiao),
        ("Por status", &agregado.por_status),
        ("Por foco", &agregado.por_foco),
        ("Por tipo de visita", &agregado.por_tipo_visita),
        ("Por altura de voo", &agregado.por_altura_voo),
        ("Por unidade (UVIS)", &agregado.por_unidade),
    ];
    for (titulo, grupos) in blocos {
        doc.push(tabela_de_grupos(titulo, grupos)?);
    }

    // --- Detalhamento em blocos limitados ---
    doc.push(PageBreak::new());
    doc.push(Paragraph::new("Detalhamento das solicitações").styled(titulo_secao));
    doc.push(Break::new(0.5));
    if detalhes.is_empty() {
        doc.push(Paragraph::new("Sem registos no período.").styled(normal));
    } else {
        for (indice, bloco_linhas) in detalhes.chunks(LINHAS_POR_BLOCO).enumerate() {
            if indice > 0 {
                doc.push(PageBreak::new());
            }
            doc.push(tabela_de_detalhes(bloco_linhas)?);
            doc.push(Break::new(1.0));
        }
    }

    doc.push(Break::new(1.0));
    doc.push(
        Paragraph::new("Gerado pelo SGSV - Sistema de Gestão de Solicitações de Voo")
            .aligned(Alignment::Center)
            .styled(Style::new().italic().with_font_size(7)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(erro_pdf)?;
    Ok(buffer)
}
