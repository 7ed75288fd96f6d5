pub mod face_detect;
