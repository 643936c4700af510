// SPDX-License-Identifier: Apache-2.0

//! The fixed questionnaire catalog: 41 questions, order-significant,
//! grouped by dimension. Defined once at compile time and never mutated.

use crate::dimension::Dimension;
use serde::Serialize;

pub const QUESTION_COUNT: usize = 41;
pub const ENVIRONMENTAL_QUESTION_COUNT: usize = 25;
pub const SOCIAL_QUESTION_COUNT: usize = 8;
pub const GOVERNANCE_QUESTION_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: u16,
    pub dimension: Dimension,
    pub text: &'static str,
}

const fn q(id: u16, dimension: Dimension, text: &'static str) -> Question {
    Question {
        id,
        dimension,
        text,
    }
}

use Dimension::{Environmental, Governance, Social};

static QUESTIONS: [Question; QUESTION_COUNT] = [
    q(1, Environmental, "A propriedade possui sistema de gestão de resíduos sólidos implementado?"),
    q(2, Environmental, "Existe controle do uso de agrotóxicos e fertilizantes na propriedade?"),
    q(3, Environmental, "A propriedade realiza manejo sustentável das pastagens?"),
    q(4, Environmental, "Há sistema de captação e tratamento de água na propriedade?"),
    q(5, Environmental, "A propriedade possui áreas de preservação permanente (APP) demarcadas?"),
    q(6, Environmental, "Existe monitoramento da qualidade da água utilizada na propriedade?"),
    q(7, Environmental, "A propriedade realiza controle de erosão do solo?"),
    q(8, Environmental, "Há sistema de compostagem ou aproveitamento de resíduos orgânicos?"),
    q(9, Environmental, "A propriedade possui reserva legal averbada?"),
    q(10, Environmental, "Existe programa de recuperação de áreas degradadas?"),
    q(11, Environmental, "A propriedade utiliza fontes de energia renovável?"),
    q(12, Environmental, "Há controle de emissões de gases de efeito estufa?"),
    q(13, Environmental, "A propriedade possui certificação ambiental?"),
    q(14, Environmental, "Existe sistema de irrigação eficiente (quando aplicável)?"),
    q(15, Environmental, "A propriedade realiza análise periódica do solo?"),
    q(16, Environmental, "Há programa de plantio de árvores nativas?"),
    q(17, Environmental, "A propriedade possui sistema de tratamento de efluentes?"),
    q(18, Environmental, "Existe controle de pragas com métodos sustentáveis?"),
    q(19, Environmental, "A propriedade realiza rotação de pastagens?"),
    q(20, Environmental, "Há monitoramento da biodiversidade local?"),
    q(21, Environmental, "A propriedade possui sistema de coleta seletiva?"),
    q(22, Environmental, "Existe uso racional da água na propriedade?"),
    q(23, Environmental, "A propriedade realiza adubação orgânica?"),
    q(24, Environmental, "Há controle de queimadas na propriedade?"),
    q(25, Environmental, "A propriedade possui licenciamento ambiental atualizado?"),
    q(26, Social, "A propriedade oferece treinamento regular aos funcionários?"),
    q(27, Social, "Existe política de saúde e segurança do trabalho implementada?"),
    q(28, Social, "A propriedade mantém relacionamento com a comunidade local?"),
    q(29, Social, "Há programas de capacitação profissional para funcionários?"),
    q(30, Social, "A propriedade oferece benefícios sociais aos trabalhadores?"),
    q(31, Social, "Existe política de não discriminação no trabalho?"),
    q(32, Social, "A propriedade contribui para projetos sociais locais?"),
    q(33, Social, "Há respeito aos direitos trabalhistas e legislação vigente?"),
    q(34, Governance, "A propriedade possui sistema de controle financeiro organizado?"),
    q(35, Governance, "Existe planejamento estratégico formalizado para a propriedade?"),
    q(36, Governance, "A propriedade mantém registros e documentação atualizados?"),
    q(37, Governance, "Há transparência na gestão e tomada de decisões?"),
    q(38, Governance, "A propriedade possui código de conduta estabelecido?"),
    q(39, Governance, "Existe sistema de controle interno e auditoria?"),
    q(40, Governance, "A propriedade realiza prestação de contas regularmente?"),
    q(41, Governance, "Há políticas anticorrupção e de integridade implementadas?"),
];

/// The full ordered catalog.
#[must_use]
pub fn questions() -> &'static [Question] {
    &QUESTIONS
}

#[must_use]
pub fn question_by_id(id: u16) -> Option<&'static Question> {
    if id == 0 {
        return None;
    }
    QUESTIONS.get(usize::from(id) - 1)
}

/// All question ids belonging to one dimension, in catalog order.
pub fn dimension_question_ids(dimension: Dimension) -> impl Iterator<Item = u16> {
    QUESTIONS
        .iter()
        .filter(move |question| question.dimension == dimension)
        .map(|question| question.id)
}
