use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::{query::ListStudentsQuery, student::StudentRequest},
    errors::AppError,
    AppState,
};

#[instrument(skip(state, query))]
pub async fn list_students(
    state: web::Data<AppState>,
    query: web::Query<ListStudentsQuery>,
) -> Result<impl Responder, AppError> {
    let student_handler = &state.student_handler;

    let page = student_handler.list_students(&query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_student_stats(
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let stats = state.student_handler.student_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[instrument(skip(student_id, state))]
pub async fn get_student_by_id(
    student_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let student = state.student_handler.get_student(&student_id).await?;
    Ok(HttpResponse::Ok().json(student))
}

#[instrument(skip(state, data))]
pub async fn create_student(
    state: web::Data<AppState>,
    data: web::Json<StudentRequest>,
) -> Result<impl Responder, AppError> {
    let student_handler = &state.student_handler;

    let student = student_handler
        .create_student(data.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(student))
}

#[instrument(skip(student_id, state, data))]
pub async fn update_student(
    student_id: web::Path<String>,
    state: web::Data<AppState>,
    data: web::Json<StudentRequest>,
) -> Result<impl Responder, AppError> {
    let student_handler = &state.student_handler;

    let student = student_handler
        .update_student(&student_id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(student))
}

#[instrument(skip(student_id, state))]
pub async fn delete_student(
    student_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.student_handler.delete_student(&student_id).await?;
    Ok(HttpResponse::Ok().json(response))
}
